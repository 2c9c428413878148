use super::request::parse_request;
use super::response::{write_envelope, write_file_reply};
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;

/// The `may_minihttp` service: wire format in, dispatcher, wire format out.
///
/// Cloned once per connection by the server runtime; all clones share the
/// same dispatcher (and through it the read-only routing table).
#[derive(Clone)]
pub struct GatewayService {
    dispatcher: Arc<Dispatcher>,
}

impl GatewayService {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        GatewayService {
            dispatcher: Arc::new(dispatcher),
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl HttpService for GatewayService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = parse_request(req);
        match self.dispatcher.dispatch(request) {
            DispatchOutcome::Envelope(envelope) => write_envelope(res, &envelope),
            DispatchOutcome::File(file) => write_file_reply(res, file),
        }
        Ok(())
    }
}
