//! Rosen is an extensible URL rule mapper.
//!
//! A set of declarative rule patterns compiles into a prefix-sharing
//! state machine that resolves `(method, host, path)` tuples into an
//! endpoint and typed parameters, and builds URLs back out of endpoint
//! names and values.
//!
//! ```
//! use rosen::{Map, Rule, Value};
//!
//! let mut map = Map::new();
//! map.add(Rule::new("/", "index")).unwrap();
//! map.add(Rule::new("/blog/<int:year>/<slug>", "blog_entry")).unwrap();
//! map.update();
//!
//! let urls = map.bind("example.com").finish().unwrap();
//!
//! let (rule, values) = urls
//!     .match_request(Some("/blog/2018/hello-world"), None, None, false)
//!     .unwrap();
//! assert_eq!(rule.endpoint(), "blog_entry");
//! assert_eq!(values["year"], Value::Int(2018));
//!
//! let url = urls.build("blog_entry", Some(&values), None, false, true).unwrap();
//! assert_eq!(url, "/blog/2018/hello-world");
//! ```

#![doc(html_root_url = "https://docs.rs/rosen/0.1.0")]
#![warn(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    rust_2018_compatibility,
    unused
)]

pub mod converters;
pub mod error;
pub mod map;
pub mod rule;

mod matcher;
mod util;

pub use crate::{
    converters::{Converter, ConverterArgs, Value, Values},
    error::{BuildError, MatchError},
    map::{Binder, Dispatch, Map, MapAdapter},
    rule::Rule,
};
