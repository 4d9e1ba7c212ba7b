use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tiger::artifacts::objects::object_type::ObjectType;
use tiger::commands::plumbing::cat_file::cat_file;
use tiger::commands::plumbing::hash_object::hash_object;
use tiger::commands::plumbing::rev_parse::rev_parse;
use tiger::commands::porcelain::init::init;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tiger",
    version = "0.1.0",
    about = "A content-addressed object store with a git-compatible layout",
    long_about = "tiger stores blobs, trees, commits and tags as compressed, \
    SHA-1 addressed loose objects inside a git-compatible repository layout.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the payload of an object in the repository. \
        Annotated tags are followed until an object of the requested type is found."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "Pretty-print the object instead of writing its raw payload")]
        pretty: bool,
        #[arg(index = 1, help = "The expected object type (blob, tree, commit, tag)")]
        object_type: ObjectType,
        #[arg(index = 2, help = "The object to print")]
        object: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database",
        long_about = "This command hashes a file as an object and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(short = 't', long = "type", default_value = "blob", help = "The object type")]
        object_type: ObjectType,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "rev-parse",
        about = "Resolve a name to an object id",
        long_about = "This command resolves a full or abbreviated object id, HEAD, or a branch or tag name \
        to a full object id."
    )]
    RevParse {
        #[arg(long = "type", help = "Peel tags until an object of this type is reached")]
        object_type: Option<ObjectType>,
        #[arg(index = 1)]
        name: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Init { path } => init(&path.unwrap_or(pwd), &mut stdout)?,
        Commands::CatFile {
            pretty,
            object_type,
            object,
        } => cat_file(&pwd, object_type, &object, pretty, &mut stdout)?,
        Commands::HashObject {
            write,
            object_type,
            file,
        } => hash_object(&pwd, &file, object_type, write, &mut stdout)?,
        Commands::RevParse { object_type, name } => {
            rev_parse(&pwd, &name, object_type, &mut stdout)?
        }
    }

    Ok(())
}
