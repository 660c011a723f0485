//! Logging decorator for outbound requests.
//!
//! # Design
//! `Transport` is the seam where a caller plugs in whatever actually sends
//! requests. `LoggingTransport` wraps one: before delegating it renders the
//! request as a curl command, with secrets masked, and hands the string to a
//! `Printer`. The printer runs inside a span carrying the method and URL so
//! sinks that log through `tracing` get the request context for free.

use std::io::{self, Cursor, Read};

use tracing::{debug, info, info_span};

use crate::builder::CurlBuilder;
use crate::http::{HttpRequest, HttpResponse};

/// Sends an `HttpRequest` and returns the response.
pub trait Transport {
    type Error;

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).round_trip(request)
    }
}

/// Receives rendered commands.
pub trait Printer {
    fn print(&self, command: &str);
}

impl<F: Fn(&str)> Printer for F {
    fn print(&self, command: &str) {
        self(command)
    }
}

/// Emits each command as an `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPrinter;

impl Printer for TracingPrinter {
    fn print(&self, command: &str) {
        info!(target: "curlbuilder", command, "outbound request");
    }
}

/// A `Transport` that prints every request as a curl command before
/// sending it through `next`.
#[derive(Debug, Clone)]
pub struct LoggingTransport<T, P = TracingPrinter> {
    next: T,
    printer: P,
    secrets: Vec<String>,
}

impl<T: Transport> LoggingTransport<T> {
    /// Wrap `next`, printing through `tracing`.
    pub fn with_tracing(next: T) -> Self {
        Self::new(next, TracingPrinter)
    }
}

impl<T: Transport, P: Printer> LoggingTransport<T, P> {
    pub fn new(next: T, printer: P) -> Self {
        Self {
            next,
            printer,
            secrets: Vec::new(),
        }
    }

    /// Header names masked in every printed command.
    pub fn with_secrets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secrets.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn into_inner(self) -> T {
        self.next
    }
}

impl<T: Transport, P: Printer> Transport for LoggingTransport<T, P> {
    type Error = T::Error;

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        let span = info_span!("round_trip", method = %request.method, url = %request.url);
        let _guard = span.enter();

        let command = CurlBuilder::from_http_request(&request)
            .set_secret(self.secrets.iter().map(String::as_str))
            .render();
        debug!(bytes = command.len(), "rendered curl command");
        self.printer.print(&command);

        self.next.round_trip(request)
    }
}

/// Read `body` to the end and return two independent readers over the same
/// bytes: one to hand to a `CurlBuilder`, one to keep using.
pub fn drain_body<R: Read>(mut body: R) -> io::Result<(Cursor<Vec<u8>>, Cursor<Vec<u8>>)> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf)?;
    Ok((Cursor::new(buf.clone()), Cursor::new(buf)))
}
