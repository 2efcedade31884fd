use clap::Parser;
use miette::{IntoDiagnostic, miette};
use rainbow_lang::encoder::{self, Encoder};
use rainbow_lang::{Color, LineComposer, Modifier, Program};
use std::fs;
use std::io::{self, BufRead, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use strum::IntoEnumIterator;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "RAINBOW_LOG";

const CONFIG_DIR: &str = "rainbow";
const CONFIG_EXTENSION: &str = "rainbow";

#[derive(Parser, Debug, Default)]
#[command(name = "rainbow")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "# Examples:\n\n\
    ## To color a log with a configuration file:\n\
    rainbow -c drone.rainbow drone.log\n\n\
    ## To use <config dir>/rainbow/drone.rainbow:\n\
    tail -f drone.log | rainbow drone\n\n\
    ## To check a configuration:\n\
    rainbow --check -c drone.rainbow")]
#[command(
    about = "rainbow colors the lines of a text stream with regular expressions.",
    long_about = None
)]
pub struct Cli {
    /// Load the configuration from the file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Color the output even if it is not a terminal
    #[arg(long, default_value_t = false)]
    color: bool,

    /// Set output format
    #[arg(short = 'F', long, value_enum, default_value_t)]
    output_format: OutputFormat,

    /// Print lines failing to evaluate uncolored instead of stopping
    #[arg(long, default_value_t = false)]
    keep_going: bool,

    /// Load the configuration and exit
    #[arg(long, default_value_t = false)]
    check: bool,

    /// List the known colors and modifiers
    #[arg(long, default_value_t = false)]
    list_colors: bool,

    /// Name of a configuration in the user configuration directory
    #[arg(value_name = "CONFIG")]
    name: Option<String>,
    files: Vec<PathBuf>,
}

/// How colored lines are written.
/// - Auto: Ansi on a terminal or with `--color`, Plain otherwise.
/// - Ansi: escape codes around every colored segment.
/// - Delta: escape codes only where the colors change.
/// - Plain: the text only.
/// - Debug: one record per segment with its properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Auto,
    Ansi,
    Delta,
    Plain,
    Debug,
}

impl OutputFormat {
    fn resolve(self, force_color: bool, is_terminal: bool, term: Option<&str>) -> Self {
        match self {
            OutputFormat::Auto if force_color || (is_terminal && term != Some("dumb")) => {
                OutputFormat::Ansi
            }
            OutputFormat::Auto => OutputFormat::Plain,
            format => format,
        }
    }

    fn encoder(self) -> Box<dyn Encoder> {
        match self {
            OutputFormat::Auto | OutputFormat::Ansi => Box::new(encoder::Ansi),
            OutputFormat::Delta => Box::new(encoder::AnsiDelta::default()),
            OutputFormat::Plain => Box::new(encoder::Plain),
            OutputFormat::Debug => Box::new(encoder::Debug),
        }
    }
}

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        if self.list_colors {
            return self.print_colors(&mut io::stdout().lock());
        }

        let mut program = self.load_program()?;
        if self.check {
            eprintln!("{}: configuration is valid", program.name());
            return Ok(());
        }

        let format = self.output_format.resolve(
            self.color,
            io::stdout().is_terminal(),
            std::env::var("TERM").ok().as_deref(),
        );
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());
        let files = self.files();
        if files.is_empty() {
            return self
                .process(&mut program, io::stdin().lock(), &mut handle, format)
                .map(|_| ());
        }
        for file in &files {
            let reader = fs::File::open(file)
                .map(io::BufReader::new)
                .map_err(|e| miette!("Failed to open {}: {}", file.display(), e))?;
            if !self.process(&mut program, reader, &mut handle, format)? {
                break;
            }
        }
        Ok(())
    }

    fn print_colors(&self, w: &mut impl Write) -> miette::Result<()> {
        writeln!(w, "colors:").into_diagnostic()?;
        for color in Color::iter() {
            writeln!(w, "  {}", color).into_diagnostic()?;
        }
        writeln!(w, "  none").into_diagnostic()?;
        writeln!(w, "modifiers:").into_diagnostic()?;
        for modifier in Modifier::iter() {
            writeln!(w, "  {}", modifier).into_diagnostic()?;
        }
        Ok(())
    }

    /// The positional files, with the positional configuration name taken as
    /// the first file when `--config` is given.
    fn files(&self) -> Vec<PathBuf> {
        match (&self.config, &self.name) {
            (Some(_), Some(name)) => std::iter::once(PathBuf::from(name))
                .chain(self.files.iter().cloned())
                .collect(),
            _ => self.files.clone(),
        }
    }

    fn config_path(&self) -> miette::Result<PathBuf> {
        match (&self.config, &self.name) {
            (Some(path), _) => Ok(path.clone()),
            (None, Some(name)) => {
                let dir = dirs::config_dir()
                    .ok_or_else(|| miette!("The user configuration directory is unknown"))?;
                Ok(Self::named_config(dir, name))
            }
            (None, None) => Err(miette!("A configuration is required, use -c FILE or CONFIG")),
        }
    }

    fn named_config(dir: PathBuf, name: &str) -> PathBuf {
        dir.join(CONFIG_DIR)
            .join(format!("{}.{}", name, CONFIG_EXTENSION))
    }

    fn load_program(&self) -> miette::Result<Program> {
        let path = self.config_path()?;
        let source = fs::read_to_string(&path)
            .map_err(|e| miette!("Failed to read {}: {}", path.display(), e))?;
        Program::new(path.display().to_string(), source).map_err(miette::Report::new)
    }

    /// Colors every line of `reader`. Returns `false` once the output is
    /// closed by the reader on the other end.
    fn process<R: BufRead, W: Write>(
        &self,
        program: &mut Program,
        mut reader: R,
        w: &mut W,
        format: OutputFormat,
    ) -> miette::Result<bool> {
        let mut line = LineComposer::new();
        let mut number = 0usize;

        loop {
            let mut buf = Vec::new();
            if reader.read_until(b'\n', &mut buf).into_diagnostic()? == 0 {
                break;
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            number += 1;

            line.init(buf);
            let encoder = match line.apply_program(program) {
                Ok(()) => format.encoder(),
                Err(err) if self.keep_going => {
                    tracing::warn!(line = number, "{}", err);
                    Box::new(encoder::Plain)
                }
                Err(err) => return Err(miette::Report::new(err)),
            };
            match line.output(w, encoder).and_then(|_| w.flush()) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(false),
                Err(e) => return Err(e).into_diagnostic(),
            }
        }

        Ok(true)
    }
}
