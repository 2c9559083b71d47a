// src/main.rs
//
// htmliter: print the events of a single-pass HTML iteration, one per line.
//
//   text "..."                          normalized text run
//   single <name> attrs .classes        void / self-closing tag
//   script <name> attrs [start..end]    script element, body range
//   enter <name> attrs .classes [a..=b c..=d]
//                                       container, opening and closing tag offsets
//   leave <name>                        container closed
//
// CLI flags:
//   --skip TAG   : do not descend into TAG containers (repeatable)
//   --keep-head  : report the <head> of full documents too
//   --step       : drive the iteration one step at a time, printing "# step N"
//   -v / -vv     : debug / trace logging on stderr (RUST_LOG overrides)

use clap::{ArgAction, Parser};
use htmliter::{Config, ContainerSpan, HtmlCallback, HtmlIterator, TagRecord};
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Do not descend into containers with this tag name
    #[arg(long = "skip", value_name = "TAG")]
    skip: Vec<String>,

    /// Report the content of <head> in full documents
    #[arg(long = "keep-head", action = ArgAction::SetTrue)]
    keep_head: bool,

    /// Drive the iteration one step at a time
    #[arg(long, action = ArgAction::SetTrue)]
    step: bool,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Input file, "-" for stdin
    input: PathBuf,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let src = if cli.input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&cli.input)?
    };

    let config = Config {
        skip_head: !cli.keep_head,
    };
    let stdout = io::stdout();
    let printer = EventPrinter::new(BufWriter::new(stdout.lock()), &cli.skip);

    let mut iterator = HtmlIterator::with_config(config);
    iterator.set_content(src);
    iterator.set_callback(printer);
    info!(full_document = iterator.is_full_document(), "content set");

    let outcome = if cli.step {
        let mut n = 0usize;
        loop {
            if let Some(printer) = iterator.callback_mut() {
                printer.line(format_args!("# step {n}"));
            }
            n += 1;
            if !iterator.step() {
                break;
            }
        }
        match iterator.last_error() {
            Some(err) if err.is_fatal() => Err(err.clone()),
            _ => Ok(()),
        }
    } else {
        iterator.run()
    };

    if let Some(printer) = iterator.take_callback() {
        printer.finish()?;
    }
    outcome.map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/* ============================== Event output ============================= */

/// Writes one line per event. The first write error is kept and reported
/// by `finish`; later events are dropped.
struct EventPrinter<W: Write> {
    out: W,
    skip: Vec<String>,
    error: Option<io::Error>,
}

impl<W: Write> EventPrinter<W> {
    fn new(out: W, skip: &[String]) -> Self {
        EventPrinter {
            out,
            skip: skip.iter().map(|s| s.to_ascii_lowercase()).collect(),
            error: None,
        }
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self
            .out
            .write_fmt(args)
            .and_then(|()| self.out.write_all(b"\n"))
        {
            self.error = Some(err);
        }
    }

    fn finish(mut self) -> io::Result<()> {
        match self.error.take() {
            Some(err) => Err(err),
            None => self.out.flush(),
        }
    }
}

/// `name key="value" .class`, attributes sorted by name.
fn describe(tag: &TagRecord) -> String {
    let mut out = String::from(tag.name());
    let mut attributes: Vec<_> = tag
        .attributes()
        .iter()
        .filter(|(name, _)| name.as_str() != "class")
        .collect();
    attributes.sort();
    for (name, value) in attributes {
        out.push_str(&format!(" {name}={value:?}"));
    }
    for class in tag.classes() {
        out.push(' ');
        out.push('.');
        out.push_str(class);
    }
    out
}

impl<W: Write> HtmlCallback for EventPrinter<W> {
    fn on_text(&mut self, text: &str) {
        self.line(format_args!("text {text:?}"));
    }

    fn on_single_tag(&mut self, tag: &TagRecord) {
        self.line(format_args!("single {}", describe(tag)));
    }

    fn on_script(&mut self, tag: &TagRecord) {
        let range = tag.pair_content().unwrap_or_default();
        self.line(format_args!(
            "script {} [{}..{}]",
            describe(tag),
            range.start,
            range.end
        ));
    }

    fn on_enter_container(&mut self, tag: &TagRecord, span: ContainerSpan) -> bool {
        self.line(format_args!(
            "enter {} [{}..={} {}..={}]",
            describe(tag),
            span.open_start,
            span.open_end,
            span.close_start,
            span.close_end
        ));
        !self.skip.iter().any(|s| s == tag.name())
    }

    fn on_leave_container(&mut self, tag: &TagRecord) {
        self.line(format_args!("leave {}", tag.name()));
    }
}
