//! Server uplink abstraction
//!
//! This module defines the trait for sending commands over the single
//! live connection to the quiz server. The abstraction keeps the state
//! machine free of transport concerns: the embedding runtime might use a
//! WebSocket, Server-Sent Events with a command channel, or an in-memory
//! pipe in tests.

use crate::protocol::ClientMessage;

/// Trait for sending commands through the live server connection
///
/// The session controller never holds an uplink; it asks a finder
/// closure for the current one on each send, so a connection that
/// dropped mid-handler simply swallows the command (fire-and-forget).
pub trait Uplink {
    /// Sends a command to the server
    ///
    /// # Arguments
    ///
    /// * `message` - The command to send
    fn send_message(&self, message: &ClientMessage);

    /// Closes the connection
    ///
    /// Called when the client forcibly tears the transport down, for
    /// example after a transport error.
    fn close(self);
}
