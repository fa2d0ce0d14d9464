//! Item classification and parser options.

/// The classification of the current item, as returned by
/// [`crate::Reader::item_type`].
///
/// `End` is sticky: once set, every subsequent call leaves it unchanged.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemType {
    /// No `next()` call has been made yet.
    Begin,
    /// A start-tag, e.g. `<a>`.
    Prefix,
    /// An end-tag, e.g. `</a>`.
    Suffix,
    /// A self-closing tag, e.g. `<a/>`.
    SelfClosing,
    /// A text block; raw (still containing entity references) if
    /// [`Options::keep_entities`] is set, decoded otherwise.
    EscapedText,
    /// A `<![CDATA[...]]>` section.
    CData,
    /// A `<?...?>` processing instruction.
    PI,
    /// A `<!--...-->` comment.
    Comment,
    /// A `<!...>` document type declaration.
    DTD,
    /// Terminal: no further progress is possible.
    End,
}

impl ItemType {
    /// `true` for [`ItemType::Prefix`] or [`ItemType::SelfClosing`].
    #[inline]
    pub fn is_prefix(self) -> bool {
        matches!(self, ItemType::Prefix | ItemType::SelfClosing)
    }

    /// `true` for [`ItemType::Suffix`] or [`ItemType::SelfClosing`] — the
    /// two classifications that close an element.
    #[inline]
    pub fn is_element_end(self) -> bool {
        matches!(self, ItemType::Suffix | ItemType::SelfClosing)
    }
}

/// Parser behavior flags.
///
/// Two independent bits: whether text keeps its entity references raw, and
/// whether CDATA sections keep their `<![CDATA[`/`]]>` markers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    /// If set, text fragments are passed through unchanged; if unset,
    /// predefined and numeric character references are decoded in place.
    pub keep_entities: bool,
    /// If set, a CDATA item's text keeps its literal `<![CDATA[`/`]]>`
    /// wrapper; if unset, only the payload is exposed.
    pub keep_cdata_markers: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            keep_entities: false,
            keep_cdata_markers: false,
        }
    }
}
