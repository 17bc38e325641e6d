// SPDX-License-Identifier: AGPL-3.0-or-later

//! DID document resolution and authority endpoint location.

pub mod document;
pub mod locator;
pub mod resolver;

pub use document::{DidDocument, DidService};
pub use locator::AuthorityLocator;
pub use resolver::{DidError, DidResolver, WebDidResolver};
