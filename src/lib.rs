//! A pull-style streaming XML reader for throughput-oriented bulk
//! processing of documents that may be much larger than available memory.
//!
//! ## Description
//!
//! - [`Reader`]: drives iteration one item at a time over a fixed-size
//!   buffer, refilling from a [`ByteSource`](source::ByteSource) on demand.
//!   Exposes the raw lexical form of every item, an unescaped view of
//!   character data, and a cheap ancestor-chain view without ever building
//!   a document tree.
//! - [`Sink`](sink::Sink): the external collaborator the convenience
//!   `write_item`/`write_element` helpers copy item bytes into.
//!
//! ## Example
//!
//! ```rust
//! use pull_xml::{ItemType, Reader};
//! use pull_xml::source::SliceSource;
//!
//! let mut reader = Reader::new(64 * 1024);
//! reader.bind(SliceSource::new(b"<doc><item id=\"1\">hello</item></doc>"));
//!
//! let mut texts = Vec::new();
//! while reader.next() {
//!     match reader.item_type() {
//!         ItemType::Prefix if reader.name() == b"item" => {
//!             let id = reader
//!                 .attributes()
//!                 .find(|a| a.name == b"id")
//!                 .map(|a| a.value.to_vec());
//!             assert_eq!(id.as_deref(), Some(&b"1"[..]));
//!         }
//!         ItemType::EscapedText => texts.push(reader.text().to_vec()),
//!         _ => {}
//!     }
//! }
//! assert_eq!(texts, vec![b"hello".to_vec()]);
//! assert!(reader.eof());
//! ```
//!
//! ## Non-goals
//!
//! Not a validator: well-formedness is enforced only to the extent lexical
//! recognition requires (unterminated tags and unmatched end-tags are
//! surfaced; everything else is the caller's responsibility). No DTD
//! processing beyond lexical capture, no namespace resolution, no encoding
//! autodetection, no document-tree construction.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cursor;
mod decode;
pub mod error;
mod item;
mod path;
mod reader;
mod scanner;
pub mod sink;
pub mod source;

pub use cursor::DEFAULT_CAPACITY;
pub use error::{Error, ErrorCode, Result};
pub use item::{ItemType, Options};
pub use path::{Attribute, Attributes, PathStack};
pub use reader::Reader;
