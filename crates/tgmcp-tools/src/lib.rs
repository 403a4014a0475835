// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The seven Telegram MCP tools (spec.md §6's catalogue), their shared
//! [`Tool`] trait, and the [`ToolRegistry`] dispatcher implementing the
//! error-handling/auth-context interceptor chain (spec.md §4.9).
pub mod builtin;
pub mod registry;
pub mod tool;

pub use registry::{ToolRegistry, ToolSchema};
pub use tool::{ErrorRecord, Tool, ToolCall, ToolOutput};

pub use builtin::generate_links::GenerateLinksTool;
pub use builtin::get_contact_details::GetContactDetailsTool;
pub use builtin::invoke_mtproto::InvokeMtprotoTool;
pub use builtin::read_messages::ReadMessagesTool;
pub use builtin::search_contacts::SearchContactsTool;
pub use builtin::search_messages::SearchMessagesTool;
pub use builtin::send_or_edit_message::SendOrEditMessageTool;
