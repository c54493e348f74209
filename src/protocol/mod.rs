//! Wire protocol
//!
//! JSON bodies for the HTTP API and websocket frames.

pub mod message;

pub use message::{
    ClientMessage, DeleteRequest, ErrorResponse, LeaderboardResponse, ServerMessage,
    SubmitRequest, SuccessResponse,
};
