//! Registered-procedure descriptors and the values handlers produce.
//!
//! A [`Procedure`] bundles everything the dispatcher needs for one route:
//! descriptive metadata, the parameter contract, and the callable itself. The
//! callable is stored directly in the descriptor as an `Arc` closure, so a
//! route lookup yields something invokable with no further indirection.

use crate::signature::Signature;
use serde_json::{json, Value};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

/// What a handler invocation produces on success.
pub enum Reply {
    /// A JSON-serializable value, wrapped in the response envelope.
    Value(Value),
    /// An open file streamed back as an attachment, bypassing the envelope.
    File(FileReply),
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Reply::File(file) => f.debug_tuple("File").field(&file.filename).finish(),
        }
    }
}

/// An open file plus the name advertised in `Content-Disposition`.
///
/// The handle stays open until the response body has been written; dropping
/// the reply closes it on every exit path, including failed writes.
#[derive(Debug)]
pub struct FileReply {
    file: File,
    filename: String,
}

impl FileReply {
    /// Open `path` for reading and advertise its basename as the download
    /// filename.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        let file = File::open(path)?;
        Ok(FileReply { file, filename })
    }

    /// Wrap an already-open file under an explicit download name.
    pub fn new(file: File, filename: impl Into<String>) -> Self {
        FileReply {
            file,
            filename: filename.into(),
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Read the remaining contents and close the handle.
    pub fn into_bytes(mut self) -> io::Result<(String, Vec<u8>)> {
        let mut bytes = Vec::new();
        self.file.read_to_end(&mut bytes)?;
        Ok((self.filename, bytes))
    }
}

/// Failure raised by a handler body, classified for the response status.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler looked for something that does not exist; surfaces as a
    /// 404 with the reason in the envelope's `error` field.
    #[error("{0}")]
    NotFound(String),
    /// Any other failure; surfaces as a 500.
    #[error(transparent)]
    Failure(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn not_found(reason: impl Into<String>) -> Self {
        HandlerError::NotFound(reason.into())
    }

    pub fn failure(message: impl fmt::Display) -> Self {
        HandlerError::Failure(anyhow::anyhow!("{message}"))
    }
}

/// Result type handlers return.
pub type HandlerResult = Result<Reply, HandlerError>;

/// The stored callable: positional JSON arguments in, reply or error out.
pub type HandlerFn = Arc<dyn Fn(Vec<Value>) -> HandlerResult + Send + Sync>;

/// Conversion from ordinary handler return values into a [`Reply`].
///
/// Lets `#[procedure]` functions return plain values (`i64`, `String`,
/// `serde_json::Value`, a [`FileReply`]...) or a `Result` of one of those,
/// without envelope plumbing at every return site.
pub trait IntoReply {
    fn into_reply(self) -> HandlerResult;
}

impl IntoReply for Reply {
    fn into_reply(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoReply for FileReply {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::File(self))
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(self))
    }
}

impl IntoReply for () {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(Value::Null))
    }
}

impl IntoReply for bool {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(json!(self)))
    }
}

impl IntoReply for i64 {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(json!(self)))
    }
}

impl IntoReply for u64 {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(json!(self)))
    }
}

impl IntoReply for f64 {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(json!(self)))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(Value::String(self)))
    }
}

impl IntoReply for &str {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Value(Value::String(self.to_string())))
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<HandlerError>,
{
    fn into_reply(self) -> HandlerResult {
        match self {
            Ok(value) => value.into_reply(),
            Err(e) => Err(e.into()),
        }
    }
}

/// One registered procedure: metadata, contract, and the callable.
///
/// Descriptors are immutable once built; re-registering a route replaces the
/// whole descriptor rather than mutating it.
#[derive(Clone)]
pub struct Procedure {
    name: String,
    module: String,
    source: String,
    signature: Signature,
    handler: HandlerFn,
}

impl Procedure {
    /// Build a descriptor around a callable.
    ///
    /// The caller's file and line are captured as the source location;
    /// `#[procedure]` overrides both module and source with exact values.
    #[track_caller]
    pub fn new<F>(name: impl Into<String>, signature: Signature, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> HandlerResult + Send + Sync + 'static,
    {
        let caller = std::panic::Location::caller();
        Procedure {
            name: name.into(),
            module: String::new(),
            source: format!("{}:{}", caller.file(), caller.line()),
            signature,
            handler: Arc::new(handler),
        }
    }

    /// Record the module path the procedure was declared in.
    #[must_use]
    pub fn with_module(mut self, module: &str) -> Self {
        self.module = module.to_string();
        self
    }

    /// Override the captured `file:line` source location.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call the handler with positionally bound arguments.
    ///
    /// Panic containment lives at the dispatch boundary, not here; direct
    /// callers see panics as panics.
    pub fn invoke(&self, args: Vec<Value>) -> HandlerResult {
        (self.handler)(args)
    }

    /// Metadata view used by route dumps.
    #[must_use]
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "module": self.module,
            "source": self.source,
            "parameters": {
                "all": self.signature.all(),
                "required": self.signature.required(),
                "optional": self.signature.optional(),
            },
            "default_values": self.signature.defaults(),
        })
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("source", &self.source)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
