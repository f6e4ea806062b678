//! Ready-made processors.
//!
//! - [`ApiSink`] decodes frames into a typed [`ApiMessage`] before calling
//!   the handler.
//! - [`FnProcessor`] hands the raw frame to a closure for any set of types.

use std::fmt;
use std::marker::PhantomData;

use super::Processor;
use crate::api::{ApiMessage, MessageType, RawFrame};
use crate::error::Result;

/// Processor that decodes frames into `T` before calling the handler.
///
/// Missing fields keep their defaults, so a partial frame still reaches the
/// handler. A frame that cannot be decoded at all is a processor failure.
pub struct ApiSink<T, F>
where
    T: ApiMessage + serde::de::DeserializeOwned + 'static,
    F: Fn(T) -> Result<()> + Send + Sync + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(T)>,
}

impl<T, F> ApiSink<T, F>
where
    T: ApiMessage + serde::de::DeserializeOwned + 'static,
    F: Fn(T) -> Result<()> + Send + Sync + 'static,
{
    /// Create a new typed sink.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> Processor for ApiSink<T, F>
where
    T: ApiMessage + serde::de::DeserializeOwned + 'static,
    F: Fn(T) -> Result<()> + Send + Sync + 'static,
{
    fn process(&self, frame: &RawFrame) -> Result<()> {
        let message: T = frame.decode()?;
        (self.handler)(message)
    }

    fn supported_types(&self) -> Vec<MessageType> {
        vec![T::MESSAGE_TYPE]
    }
}

impl<T, F> fmt::Debug for ApiSink<T, F>
where
    T: ApiMessage + serde::de::DeserializeOwned + 'static,
    F: Fn(T) -> Result<()> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSink")
            .field("message_type", &T::MESSAGE_TYPE)
            .finish_non_exhaustive()
    }
}

/// Processor backed by a closure over raw frames.
pub struct FnProcessor<F>
where
    F: Fn(&RawFrame) -> Result<()> + Send + Sync + 'static,
{
    types: Vec<MessageType>,
    handler: F,
}

impl<F> FnProcessor<F>
where
    F: Fn(&RawFrame) -> Result<()> + Send + Sync + 'static,
{
    /// Create a processor for the given types.
    pub fn new(types: impl IntoIterator<Item = MessageType>, handler: F) -> Self {
        Self {
            types: types.into_iter().collect(),
            handler,
        }
    }
}

impl<F> Processor for FnProcessor<F>
where
    F: Fn(&RawFrame) -> Result<()> + Send + Sync + 'static,
{
    fn process(&self, frame: &RawFrame) -> Result<()> {
        (self.handler)(frame)
    }

    fn supported_types(&self) -> Vec<MessageType> {
        self.types.clone()
    }
}

impl<F> fmt::Debug for FnProcessor<F>
where
    F: Fn(&RawFrame) -> Result<()> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcessor")
            .field("types", &self.types)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HeadPose;
    use crate::error::VcpError;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_api_sink_decodes_and_reports_type() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sink = ApiSink::new(move |pose: HeadPose| {
            seen_clone.lock().push(pose.rotation.yaw);
            Ok(())
        });

        assert_eq!(sink.supported_types(), vec![MessageType::HEAD_POSE]);

        let frame = RawFrame::parse(r#"{"type":"headPoseAPI","rotation":{"yaw":2.5}}"#).unwrap();
        sink.process(&frame).unwrap();

        assert_eq!(*seen.lock(), vec![2.5]);
    }

    #[test]
    fn test_api_sink_decode_failure_is_error() {
        let sink = ApiSink::new(|_: HeadPose| Ok(()));
        let frame = RawFrame::parse(r#"{"type":"headPoseAPI","rotation":"sideways"}"#).unwrap();

        assert!(matches!(sink.process(&frame), Err(VcpError::Json(_))));
    }

    #[test]
    fn test_fn_processor_multiple_types() {
        let processor = FnProcessor::new(
            [MessageType::HEAD_POSE, MessageType::FULL_BODY],
            |frame: &RawFrame| {
                if frame.get("fail").is_some() {
                    Err(VcpError::processor("asked to fail"))
                } else {
                    Ok(())
                }
            },
        );

        assert_eq!(
            processor.supported_types(),
            vec![MessageType::HEAD_POSE, MessageType::FULL_BODY]
        );
        assert!(processor
            .process(&RawFrame::parse(r#"{"type":"fullBodyAPI"}"#).unwrap())
            .is_ok());
        assert!(processor
            .process(&RawFrame::parse(r#"{"type":"fullBodyAPI","fail":1}"#).unwrap())
            .is_err());
    }
}
