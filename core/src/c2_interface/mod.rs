pub mod channel;
pub mod messages;

pub use channel::{ChannelError, ConnectionState, MessageReceiver, StreamingChannel};
pub use messages::{epoch_seconds, DetectionEvent, InboundMessage};
