// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This library is the request layer of a [Telegram Bot API] client.
//!
//! It knows nothing about specific methods. A [`Sender`] takes a method name and a set of
//! [`Params`], sends them in a single `multipart/form-data` request, and classifies the
//! response into either the `result` value or an [`InvocationError`].
//!
//! Parameters that are not text, numbers, booleans or files are serialized into their JSON
//! representation, so structured values such as keyboards can travel as form fields.
//!
//! [Telegram Bot API]: https://core.telegram.org/bots/api
mod configuration;
mod errors;
mod params;
mod response;
mod sender;

pub use configuration::{Configuration, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ProxyConfiguration};
pub use errors::{ConfigurationError, InvocationError, NOT_SET_BY_API, RpcError};
pub use params::{InputFile, ParamValue, Params};
pub use response::parse_response;
pub use sender::{Sender, Transport};
