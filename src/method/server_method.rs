use crate::MethodSignature;
use crate::NodeId;
use crate::Result;
use crate::Server;
use crate::Variant;

/// Handler behind a Method node.
///
/// The server validates the input count against [`ServerMethod::signature`]
/// before calling [`ServerMethod::invoke`] and the output count after it. No
/// store lock is held while the handler runs, so it may use `server` freely.
pub trait ServerMethod: Send + Sync {
    fn name(&self) -> &str;

    fn signature(&self) -> &MethodSignature;

    fn invoke(
        &self,
        server: &Server,
        object_id: &NodeId,
        inputs: &[Variant],
    ) -> Result<Vec<Variant>>;
}

/// [`ServerMethod`] backed by a closure
pub struct FnMethod<F> {
    name: String,
    signature: MethodSignature,
    handler: F,
}

impl<F> FnMethod<F>
where
    F: Fn(&Server, &NodeId, &[Variant]) -> Result<Vec<Variant>> + Send + Sync,
{
    pub fn new(
        name: impl Into<String>,
        signature: MethodSignature,
        handler: F,
    ) -> Self {
        Self {
            name: name.into(),
            signature,
            handler,
        }
    }
}

impl<F> ServerMethod for FnMethod<F>
where
    F: Fn(&Server, &NodeId, &[Variant]) -> Result<Vec<Variant>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    fn invoke(
        &self,
        server: &Server,
        object_id: &NodeId,
        inputs: &[Variant],
    ) -> Result<Vec<Variant>> {
        (self.handler)(server, object_id, inputs)
    }
}
