/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

mod macros;
pub mod api;
pub mod client;
pub mod collection;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod multipart;
mod parsers;
pub mod photo;
pub mod photoset;
pub mod request;
pub mod retry;
pub mod signer;

pub use api::*;
pub use client::*;
pub use collection::*;
pub use config::*;
pub use envelope::{ApiError, Envelope, classify};
pub use errors::*;
pub use multipart::MultipartBody;
pub use photo::*;
pub use photoset::*;
pub use request::*;
pub use retry::{Backoff, RetryState, retry};
