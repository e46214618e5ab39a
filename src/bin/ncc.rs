// src/bin/ncc.rs

//! Driver program _ncc_ drives the [_ncclib_].
//!
//! Processes user-passed command-line arguments. The line template is passed
//! directly (`--template`) or loaded from a named entry of the settings
//! store (`--setting`), then compiled once; template errors are reported
//! once and no file is processed.
//!
//! For each passed file path, a file processing thread is created. Each file
//! processing thread runs its entire pipeline: read and parse lines using a
//! [`CommentReader`] instance, stable-sort the [`Comment`s] by datetime,
//! then serialize `<chat>` records with [`write_chat`]. A failure in one
//! file's pipeline does not affect the other files.
//!
//! Every file processing thread sends its one-line status message
//! (completion or the specific error) in a [`ChanDatum`] through one shared
//! bounded [channel] to the main thread. `ncc.rs` should be the main thread
//! and the only thread that prints.
//!
//! [_ncclib_]: ncclib
//! [`CommentReader`]: ncclib::readers::commentreader::CommentReader
//! [`Comment`s]: ncclib::data::comment::Comment
//! [`write_chat`]: ncclib::printer::chatwriter::write_chat
//! [`ChanDatum`]: self::ChanDatum
//! [channel]: self::ChanSendDatum

#![allow(non_camel_case_types)]

use std::process::ExitCode;
use std::thread;

use ::anyhow::Context;
use ::clap::{
    Parser,
    ValueEnum,
};
use ::const_format::concatcp;
use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use ::si_trace_print::stack::stack_offset_set;
use ::si_trace_print::{
    defn,
    defo,
    defx,
};

use ::ncclib::common::{
    Count,
    FPath,
    FPaths,
};
use ::ncclib::data::comment::{
    sort_comments,
    Comments,
};
use ::ncclib::data::datetime::{
    datetime_parse_from_str,
    tz_offset_default,
    FixedOffset,
};
use ::ncclib::data::template::{
    compile,
    CompiledTemplate,
};
use ::ncclib::debug::printers::{
    de_err,
    e_err,
};
use ::ncclib::printer::chatwriter::{
    fpath_to_output_fpath,
    write_chat,
    OUTPUT_SUFFIX,
};
use ::ncclib::printer::printers::{
    print_colored_stderr,
    print_colored_stdout,
    ColorChoice,
    COLOR_COMPLETE,
    COLOR_ERROR,
};
use ::ncclib::readers::commentreader::CommentReader;
use ::ncclib::settings::{
    Settings,
    SETTINGS_FILE_DEFAULT,
};

use ::crossbeam_channel;

// --------------------
// command-line parsing

/// general error exit value
const EXIT_ERR: u8 = 1;

#[cfg(debug_assertions)]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "\nDEBUG BUILD";
#[cfg(not(debug_assertions))]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "";

/// `--help` _afterword_ message.
const CLI_HELP_AFTER: &str = concatcp!(
    r#"Template placeholders:
    __TIME[FORMAT]__    where the line's timestamp occurs
    __COMMENT__         where the line's comment text occurs

The placeholders may appear in either order. All other template text
matches itself; it is not pattern syntax.

FORMAT is the literal keyword "UNIXTIME" (raw epoch seconds) or a chrono
strftime pattern. Inside the brackets a backslash quotes the next
character, so "\]" is a literal "]".

Template examples (a literal TAB separates the fields of the first; most
shells can produce one with $'...\t...'):
    "__TIME[UNIXTIME]__	__COMMENT__"
    "__TIME[%H:%M:%S]__ (x) __COMMENT__"
    "[__TIME[%Y/%m/%d %H:%M:%S]__] __COMMENT__"

Each FILE is converted to "FILE"#, OUTPUT_SUFFIX, r#"" beside it, one NicoNico-style
<chat> record per comment:
    <chat user_id="a" date="1" no="1" vpos="0">…</chat>

vpos is whole seconds relative to the earliest comment; non-zero values
carry two extra random digits so comments within the same second do not
collide in the overlay player.

Timestamps without a timezone are interpreted in the --tz-offset value
(default "+09:00").

DateTime strftime specifiers are described at
https://docs.rs/chrono/latest/chrono/format/strftime/

Is ncc failing to parse a comment export? Report an Issue at
https://github.com/jtmoon79/nico-comment-converter/issues
"#,
    CLI_HELP_AFTER_NOTE_DEBUG,
);

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "ncc",
    // write expanded information for the `--version` output
    version = concatcp!(
        "(NicoNico Comment Converter)\n",
        "Version: ", env!("CARGO_PKG_VERSION"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
        "Repository: ", env!("CARGO_PKG_REPOSITORY"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path(s) of comment log files to convert.
    /// Each FILE is converted concurrently and written to "FILE.txt".
    #[clap(verbatim_doc_comment)]
    paths: Vec<String>,

    /// Line template with one __TIME[FORMAT]__ and one __COMMENT__
    /// placeholder; see the template notes after the options listing.
    #[clap(
        short = 'e',
        long,
        verbatim_doc_comment,
    )]
    template: Option<String>,

    /// Use the template saved under NAME in the settings store.
    #[clap(
        short = 's',
        long,
        verbatim_doc_comment,
        conflicts_with = "template",
    )]
    setting: Option<String>,

    /// Save the passed --template under NAME in the settings store, then
    /// convert PATHS (if any were passed).
    #[clap(
        long = "save-setting",
        verbatim_doc_comment,
        requires = "template",
    )]
    save_setting: Option<String>,

    /// List the names in the settings store, one per line, then exit.
    #[clap(
        long = "list-settings",
        verbatim_doc_comment,
    )]
    list_settings: bool,

    /// Skip lines that do not match the template instead of failing the
    /// whole file.
    /// Lines with a matching shape but an undecodable timestamp always fail
    /// the file.
    #[clap(
        short = 'i',
        long = "ignore-unparseable",
        verbatim_doc_comment,
    )]
    ignore_unparseable: bool,

    /// Default timezone offset for decoded timestamps without a timezone,
    /// e.g. "+12", "-0800", "+02:00".
    /// To pass a value with leading "-" use "=" notation, e.g. "-t=-0800".
    #[clap(
        short = 't',
        long,
        verbatim_doc_comment,
        value_parser = cli_process_tz_offset,
        default_value_t = tz_offset_default(),
    )]
    tz_offset: FixedOffset,

    /// Choose to print to terminal using colors.
    #[clap(
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Settings store file path.
    #[clap(
        long,
        verbatim_doc_comment,
        default_value = SETTINGS_FILE_DEFAULT,
    )]
    config: String,
}

/// `clap` argument validator for `--tz-offset`.
///
/// Transform a numeric timezone offset string, e.g. `"+0900"`, to a
/// [`FixedOffset`] instance by parsing a dummy datetime carrying it.
fn cli_process_tz_offset(tzo: &str) -> std::result::Result<FixedOffset, String> {
    let mut data: String = String::from("2000-01-02 03:04:05 ");
    data.push_str(tzo);
    for pattern in [
        "%Y-%m-%d %H:%M:%S %:z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S %#z",
    ] {
        let dt = datetime_parse_from_str(data.as_str(), pattern, true, &tz_offset_default());
        defo!("datetime_parse_from_str({:?}, {:?}) returned {:?}", data, pattern, dt);
        if let Some(dt_) = dt {
            defx!("return {:?}", dt_.offset());
            return Ok(*dt_.offset());
        }
    }

    Err(format!("Unable to parse a timezone offset for --tz-offset {:?}", tzo))
}

// -------------------------
// threads and the log sink

/// Size of the bounded log channel; bounds memory under many file
/// processing threads.
const CHANNEL_CAPACITY: usize = 64;

/// A single datum sent from a file processing thread to the main printing
/// thread. Exactly one is sent per thread.
#[derive(Debug)]
enum ChanDatum {
    /// file converted; input path, output path, records written
    Completed(FPath, FPath, Count),
    /// file aborted; the preformatted one-line status message
    Failed(String),
}

/// Sender channel (used by each file processing thread).
type ChanSendDatum = crossbeam_channel::Sender<ChanDatum>;

/// Receiver channel (used by main printing loop).
type ChanRecvDatum = crossbeam_channel::Receiver<ChanDatum>;

/// Helper to send a [`ChanDatum`] to the main printing thread and print an
/// error if there was an error sending.
#[inline(always)]
fn chan_send(
    chan_send_dt: &ChanSendDatum,
    chan_datum: ChanDatum,
    _path: &FPath,
) {
    match chan_send_dt.send(chan_datum) {
        Ok(_) => {}
        Err(_err) => de_err!("chan_send_dt.send(…) failed {} for {:?}", _err, _path),
    }
}

/// Process one file: parse all lines, sort, serialize. Sends exactly one
/// [`ChanDatum`] through the [channel].
///
/// [channel]: self::ChanSendDatum
fn exec_fileprocessor_thread(
    chan_send_dt: ChanSendDatum,
    path: FPath,
    template: CompiledTemplate,
    tz_offset: FixedOffset,
    ignore_unparseable: bool,
) {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(2));
    }
    defn!("({:?})", path);

    let mut rng: StdRng = StdRng::from_os_rng();
    let mut commentreader =
        CommentReader::new(path.clone(), template, tz_offset, ignore_unparseable);
    let mut comments: Comments = match commentreader.read_all(&mut rng) {
        Ok(val) => val,
        Err(err) => {
            chan_send(&chan_send_dt, ChanDatum::Failed(err.to_string()), &path);
            defx!("read_all failed");

            return;
        }
    };
    sort_comments(&mut comments);
    match write_chat(&path, &comments, &mut rng) {
        Ok(count) => {
            let path_out: FPath = fpath_to_output_fpath(&path);
            chan_send(&chan_send_dt, ChanDatum::Completed(path.clone(), path_out, count), &path);
        }
        Err(err) => {
            let message: String =
                format!("File {} could not be written: {}", fpath_to_output_fpath(&path), err);
            chan_send(&chan_send_dt, ChanDatum::Failed(message), &path);
        }
    }
    defx!("({:?})", path);
}

/// last path component, for worker thread names
fn basename(path: &FPath) -> String {
    match std::path::Path::new(path.as_str()).file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.clone(),
    }
}

/// Create one file processing thread per path then drain the log channel,
/// printing every received message.
///
/// Returns `true` if every file completed.
fn processing_loop(
    paths: FPaths,
    template: CompiledTemplate,
    tz_offset: FixedOffset,
    ignore_unparseable: bool,
    color_choice: ColorChoice,
) -> bool {
    defn!("({} paths)", paths.len());

    let (chan_send_dt, chan_recv_dt): (ChanSendDatum, ChanRecvDatum) =
        crossbeam_channel::bounded(CHANNEL_CAPACITY);

    let mut thread_count: usize = 0;
    let mut thread_err_count: usize = 0;
    for path in paths.into_iter() {
        let basename_: String = basename(&path);
        let chan_send_dt_: ChanSendDatum = chan_send_dt.clone();
        let template_: CompiledTemplate = template.clone();
        match thread::Builder::new()
            .name(basename_.clone())
            .spawn(move || {
                exec_fileprocessor_thread(chan_send_dt_, path, template_, tz_offset, ignore_unparseable)
            }) {
            Ok(_joinhandle) => {
                thread_count += 1;
            }
            Err(err) => {
                thread_err_count += 1;
                e_err!("thread.name({:?}).spawn() failed {:?}", basename_, err);
            }
        }
    }
    // drop the main thread's Sender so `recv` disconnects once every file
    // processing thread has finished
    drop(chan_send_dt);

    let mut completed_count: usize = 0;
    let mut failed_count: usize = 0;
    loop {
        match chan_recv_dt.recv() {
            Ok(ChanDatum::Completed(path, path_out, count)) => {
                defo!("ChanDatum::Completed({:?})", path);
                completed_count += 1;
                let message: String =
                    format!("Complete: {} ({} records written to {})\n", path, count, path_out);
                if let Err(_err) = print_colored_stdout(COLOR_COMPLETE, color_choice, message.as_bytes())
                {
                    de_err!("print_colored_stdout(…) failed {}", _err);
                }
            }
            Ok(ChanDatum::Failed(message)) => {
                defo!("ChanDatum::Failed({:?})", message);
                failed_count += 1;
                let message: String = format!("{}\n", message);
                if let Err(_err) = print_colored_stderr(COLOR_ERROR, color_choice, message.as_bytes()) {
                    de_err!("print_colored_stderr(…) failed {}", _err);
                }
            }
            Err(crossbeam_channel::RecvError) => {
                defo!("crossbeam_channel::RecvError; all senders disconnected");
                break;
            }
        }
    }
    defx!(
        "threads {} (+{} failed to spawn), completed {}, failed {}",
        thread_count,
        thread_err_count,
        completed_count,
        failed_count
    );

    thread_err_count == 0 && failed_count == 0 && completed_count == thread_count
}

// -----
// main

/// Resolve the template string: passed directly or loaded from the named
/// setting.
fn resolve_template(args: &CLI_Args) -> ::anyhow::Result<String> {
    match (&args.template, &args.setting) {
        (Some(template), None) => Ok(template.clone()),
        (None, Some(name)) => {
            let settings: Settings = Settings::load(&args.config)
                .with_context(|| format!("failed to load settings store {:?}", args.config))?;
            match settings.get(name) {
                Some(setting) => Ok(setting.template.clone()),
                None => ::anyhow::bail!("no setting named {:?} in {:?}", name, args.config),
            }
        }
        // `conflicts_with` prevents passing both
        (Some(_), Some(_)) => unreachable!("--template conflicts with --setting"),
        (None, None) => ::anyhow::bail!("a template is required; pass --template or --setting"),
    }
}

/// Persist the template under `name`, atomically rewriting the settings
/// store.
fn save_setting(
    config: &FPath,
    name: &str,
    template: &str,
) -> ::anyhow::Result<()> {
    // the original tool's save dialog rejected blank values
    if name.is_empty() {
        ::anyhow::bail!("Unable to use blank setting name.");
    }
    if template.is_empty() {
        ::anyhow::bail!("Unable to use blank template.");
    }
    let mut settings: Settings = Settings::load(config)
        .with_context(|| format!("failed to load settings store {:?}", config))?;
    let updated: bool = settings.upsert(name, template);
    settings
        .save(config)
        .with_context(|| format!("failed to save settings store {:?}", config))?;
    defo!("saved setting {:?} (updated existing {})", name, updated);

    Ok(())
}

pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let args = CLI_Args::parse();
    defo!("args {:?}", args);

    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };

    if args.list_settings {
        let settings: Settings = match Settings::load(&args.config) {
            Ok(val) => val,
            Err(err) => {
                e_err!("{}", err);
                defx!("list_settings failed");

                return ExitCode::from(EXIT_ERR);
            }
        };
        for name in settings.names().into_iter() {
            println!("{}", name);
        }
        defx!("list_settings");

        return ExitCode::SUCCESS;
    }

    let template_str: String = match resolve_template(&args) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{:#}", err);
            defx!("resolve_template failed");

            return ExitCode::from(EXIT_ERR);
        }
    };

    // template errors abort before any file is processed; reported once,
    // not per file
    let template: CompiledTemplate = match compile(template_str.as_str()) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{}", err);
            defx!("compile failed");

            return ExitCode::from(EXIT_ERR);
        }
    };

    if let Some(name) = &args.save_setting {
        if let Err(err) = save_setting(&args.config, name.as_str(), template_str.as_str()) {
            e_err!("{:#}", err);
            defx!("save_setting failed");

            return ExitCode::from(EXIT_ERR);
        }
        if args.paths.is_empty() {
            defx!("save_setting only");

            return ExitCode::SUCCESS;
        }
    }

    if args.paths.is_empty() {
        e_err!("no files were passed");
        defx!("no paths");

        return ExitCode::from(EXIT_ERR);
    }

    let ret: bool = processing_loop(
        args.paths.clone(),
        template,
        args.tz_offset,
        args.ignore_unparseable,
        color_choice,
    );
    defx!("processing_loop returned {}", ret);

    match ret {
        true => ExitCode::SUCCESS,
        false => ExitCode::from(EXIT_ERR),
    }
}
