//! Streams a file through [`pull_xml::Reader`] and traces one line per item
//! to stdout. Mainly useful for manually exercising the reader end-to-end
//! against real documents.

use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

use pull_xml::{ItemType, Options, Reader};

/// Trace the items of an XML file, one per line.
#[derive(Parser)]
#[command(name = "xmlcat", version)]
struct Args {
    /// Path to the XML file to read.
    path: std::path::PathBuf,

    /// Keep entity references raw instead of decoding them.
    #[arg(long)]
    keep_entities: bool,

    /// Keep the `<![CDATA[`/`]]>` markers on CDATA items.
    #[arg(long)]
    keep_cdata_markers: bool,

    /// Buffer capacity in bytes, rounded up to the cursor's granularity.
    #[arg(long, default_value_t = pull_xml::DEFAULT_CAPACITY)]
    capacity: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut reader = Reader::open_with_capacity(&args.path, args.capacity);
    reader.set_options(Options {
        keep_entities: args.keep_entities,
        keep_cdata_markers: args.keep_cdata_markers,
    });
    info!("opened {}", args.path.display());

    while reader.next() {
        debug!("depth={} consumed={}", reader.depth(), reader.bytes_consumed());
        print_item(&reader);
    }

    if reader.error_code().is_err() {
        match reader.error() {
            Some(e) => error!("{e}"),
            None => error!("unknown error"),
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_item<S: pull_xml::source::ByteSource>(reader: &Reader<S>) {
    let label = match reader.item_type() {
        ItemType::Begin => "begin",
        ItemType::Prefix => "prefix",
        ItemType::Suffix => "suffix",
        ItemType::SelfClosing => "self-closing",
        ItemType::EscapedText => "text",
        ItemType::CData => "cdata",
        ItemType::PI => "pi",
        ItemType::Comment => "comment",
        ItemType::DTD => "dtd",
        ItemType::End => "end",
    };
    println!("{:>3} {:<12} {}", reader.depth(), label, String::from_utf8_lossy(reader.text()));
}
