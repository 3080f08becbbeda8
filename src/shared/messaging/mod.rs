//! Messaging Module
//!
//! Wire data structures for the chat system:
//!
//! - `ConversationId` / `ConversationSummary` - Conversation identity and list entries
//! - `MessageView` / `SendMessageRequest` - Messages as seen by one participant
//! - `GroupResponse` / `CreateGroupRequest` - Group management
//!
//! # Usage
//!
//! ```rust
//! use securechat::shared::messaging::{ConversationId, MessageView, SendMessageRequest};
//! ```

pub mod conversation;
pub mod group;
pub mod message;

pub use conversation::{ConversationId, ConversationKind, ConversationSummary};
pub use group::{
    CreateGroupRequest, GroupMember, GroupOnlineResponse, GroupResponse, MemberAction,
    RenameGroupRequest, UpdateMemberRequest,
};
pub use message::{
    MessagePage, MessageView, PageQuery, SendMessageRequest, SendMessageResponse,
    MAX_PAYLOAD_LENGTH,
};
