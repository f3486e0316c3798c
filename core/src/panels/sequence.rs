// shopdesk/src/panels/sequence.rs

/// Tag carried by one list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Hands out increasing tickets so a slow response to a superseded request
/// (rapid paging, filter switches) cannot overwrite fresher state.
#[derive(Debug, Default, Clone)]
pub struct RequestSequencer {
  latest: u64,
}

impl RequestSequencer {
  pub fn issue(&mut self) -> RequestTicket {
    self.latest += 1;
    RequestTicket(self.latest)
  }

  /// Only the most recently issued ticket may apply its response.
  pub fn is_current(&self, ticket: RequestTicket) -> bool {
    ticket.0 == self.latest
  }
}
