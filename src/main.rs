use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use nga::bytecode::assemble;
use nga::config::{DEFAULT_CAPACITY, DEFAULT_IMAGE};
use nga::dump::write_dump;
use nga::error::{ImageError, USAGE_EXIT_CODE};
use nga::terminal::RawTerminal;
use nga::{image, Cell, Error, Machine, VmConfig};

/// Runs an Nga image.
#[derive(Parser, Debug)]
#[command(name = "nga", version, about)]
struct Cli {
  /// Image file to load.
  #[arg(long, env = "NGA_IMAGE", default_value = DEFAULT_IMAGE, conflicts_with = "source")]
  image: PathBuf,

  /// Assemble this source file and run the result instead of loading an image.
  #[arg(long)]
  source: Option<PathBuf>,

  /// Write the assembled image to this file and exit without running it.
  #[arg(long, requires = "source")]
  emit: Option<PathBuf>,

  /// After the run, write the data stack, address stack, and memory to stdout. Memory is
  /// kept at the exact image length.
  #[arg(long)]
  dump: bool,

  /// Number of cells memory is padded to.
  #[arg(long, env = "NGA_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
  capacity: usize,

  /// Fault on invalid opcodes instead of skipping them.
  #[arg(long, env = "NGA_STRICT")]
  strict: bool,

  /// Leave the terminal mode alone.
  #[arg(long)]
  no_raw: bool,
}

impl Cli {
  fn config(&self) -> VmConfig {
    VmConfig {
      capacity        : self.capacity,
      preserve_length : self.dump,
      strict_opcodes  : self.strict,
    }
  }
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("NGA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

/// Produces the memory image for the run, or `None` if there is nothing to run.
fn prepare_image(cli: &Cli, config: &VmConfig) -> Result<Option<Vec<Cell>>, Error> {
  let source_path =
    match &cli.source {
      Some(path) => path,
      None       => return Ok(Some(image::load(&cli.image, config)?))
    };

  let text =
    fs::read_to_string(source_path).map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => ImageError::NotFound(source_path.clone()),
      _                       => ImageError::Io { path: source_path.clone(), source: e }
    })?;
  let assembly = assemble(&text)?;
  debug!(
    path   = %source_path.display(),
    cells  = assembly.image.len(),
    labels = assembly.symbols.len(),
    "assembled source"
  );

  if let Some(output) = &cli.emit {
    image::save(output, &assembly.image)?;
    return Ok(None);
  }

  Ok(Some(image::prepare(assembly.image, config)))
}

fn run(cli: Cli) -> Result<(), Error> {
  let config = cli.config();

  let cells =
    match prepare_image(&cli, &config)? {
      Some(cells) => cells,
      None        => return Ok(())
    };

  let mut machine = Machine::with_config(cells, &config);
  let result = {
    let _raw = match cli.no_raw {
      true  => None,
      false => RawTerminal::enable()
    };
    machine.run()
    // `_raw` restores the terminal here, before any error is reported.
  };

  if let Err(source) = result {
    error!("machine state at fault:\n{}", machine);
    return Err(Error::Fault { ip: machine.ip(), source });
  }

  if cli.dump {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    write_dump(&mut out, &machine.into_final_state())?;
    out.flush()?;
  }

  Ok(())
}

/// Parses the command line. Usage errors exit with their own status so they cannot be
/// confused with a missing image.
fn parse_cli() -> Cli {
  match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e)  => {
      // `--help` and `--version` come through here as well.
      let code = match e.use_stderr() {
        true  => USAGE_EXIT_CODE,
        false => 0
      };
      let _ = e.print();
      process::exit(code);
    }
  }
}

fn main() {
  init_tracing();
  let cli = parse_cli();

  if let Err(e) = run(cli) {
    eprintln!("nga: {}", e);
    process::exit(e.exit_code());
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::path::Path;

  fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["nga", "--no-raw"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
  }

  fn write_image(dir: &Path, name: &str, cells: &[Cell]) -> String {
    let path = dir.join(name);
    image::save(&path, cells).unwrap();
    path.to_string_lossy().into_owned()
  }

  #[test]
  fn fault_is_reported_with_status_one(){
    let dir  = tempfile::tempdir().unwrap();
    // drop on an empty stack
    let path = write_image(dir.path(), "drop.img", &[3]);

    match run(cli(&["--image", path.as_str()])) {
      Err(e @ Error::Fault { .. }) => {
        assert_eq!(e.exit_code(), 1);
        assert_eq!(e.to_string(), "fault at ip 0: data stack underflow");
      }
      other => panic!("expected a fault, got {:?}", other)
    }
  }

  #[test]
  fn missing_image_has_its_own_status(){
    let dir  = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent").to_string_lossy().into_owned();

    let error = run(cli(&["--image", path.as_str()])).unwrap_err();
    assert_eq!(error.exit_code(), 2);
    assert_ne!(error.exit_code(), USAGE_EXIT_CODE);
  }

  #[test]
  fn clean_run(){
    let dir  = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "add.img", &[1, 5, 1, 3, 17, 26]);
    assert!(run(cli(&["--image", path.as_str(), "--capacity", "16"])).is_ok());
  }

  #[test]
  fn emit_writes_the_assembled_image(){
    let dir    = tempfile::tempdir().unwrap();
    let source = dir.path().join("add.nasm");
    let output = dir.path().join("add.img");
    fs::write(&source, "lit 5 lit 3 add end\n").unwrap();

    let source_arg = source.to_string_lossy().into_owned();
    let output_arg = output.to_string_lossy().into_owned();
    run(cli(&["--source", source_arg.as_str(), "--emit", output_arg.as_str()])).unwrap();

    let exact = VmConfig { preserve_length: true, ..VmConfig::default() };
    assert_eq!(image::load(&output, &exact).unwrap(), vec![1, 5, 1, 3, 17, 26]);
  }

  #[test]
  fn assembly_errors_exit_with_three(){
    let dir    = tempfile::tempdir().unwrap();
    let source = dir.path().join("bad.nasm");
    fs::write(&source, "lit &nowhere\n").unwrap();

    let source_arg = source.to_string_lossy().into_owned();
    let error = run(cli(&["--source", source_arg.as_str()])).unwrap_err();
    assert_eq!(error.exit_code(), 3);
  }

  #[test]
  fn bad_arguments_are_usage_errors(){
    let error = Cli::try_parse_from(vec!["nga", "--bogus"]).unwrap_err();
    assert!(error.use_stderr());

    let error = Cli::try_parse_from(vec!["nga", "--emit", "out.img"]).unwrap_err();
    assert!(error.use_stderr());
  }

}
