// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
pub mod generate_links;
pub mod get_contact_details;
pub mod invoke_mtproto;
pub mod read_messages;
pub mod search_contacts;
pub mod search_messages;
pub mod send_or_edit_message;
