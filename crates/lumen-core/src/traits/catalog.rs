// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog trait.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;

/// Lists the models the inference server currently offers.
#[async_trait]
pub trait ModelCatalog: PluginAdapter {
    /// Fetches the current listing.
    ///
    /// Never fails: any network, status, or decoding problem yields an
    /// empty list, which callers treat exactly like an absent server.
    async fn list_models(&self) -> Vec<String>;

    /// The last successful listing, or empty before the first success.
    fn last_listing(&self) -> Vec<String>;
}
