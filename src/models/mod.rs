pub mod booking;
pub mod conversation;
pub mod events;
pub mod flow;
pub mod message;
pub mod reply;

pub use booking::{BookingMode, BookingPayload};
pub use conversation::{ConversationData, ReplyMode};
pub use events::SessionEvent;
pub use flow::{BookingFlowState, FlowSnapshot, FlowStage};
pub use message::{Message, QuickReply, Role};
pub use reply::BackendReply;
