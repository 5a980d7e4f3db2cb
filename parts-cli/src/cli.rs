use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use parts_core::BackendType;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Car spare part inventory management")]
pub struct Cli {
    /// Path to the inventory database (.yaml or .db)
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Storage backend (inferred from the file extension if omitted)
    #[clap(long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Increase log output (-v info, -vv debug)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    Yaml,
    Sqlite,
}

impl From<BackendArg> for BackendType {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Yaml => BackendType::Yaml,
            BackendArg::Sqlite => BackendType::Sqlite,
        }
    }
}

/// Part fields given on the command line
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PartFields {
    /// Part ID (unique)
    #[clap(long)]
    pub part_id: Option<String>,

    /// Part name
    #[clap(long)]
    pub name: Option<String>,

    /// Compatible car model
    #[clap(long)]
    pub car_model: Option<String>,

    /// Price
    #[clap(long)]
    pub price: Option<String>,

    /// Stock quantity
    #[clap(long)]
    pub stock: Option<String>,
}

impl PartFields {
    /// Returns true if no field was given
    pub fn is_empty(&self) -> bool {
        self.part_id.is_none()
            && self.name.is_none()
            && self.car_model.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new spare part
    Add {
        #[clap(flatten)]
        fields: PartFields,

        /// Use interactive mode (prompts)
        #[clap(long, short = 'i')]
        interactive: bool,
    },

    /// List all spare parts
    List,

    /// Show a spare part
    Show {
        /// Part ID
        part_id: String,
    },

    /// Edit a spare part
    Edit {
        /// Part ID of the part to edit
        part_id: String,

        /// Name
        #[clap(long)]
        name: Option<String>,

        /// Compatible car model
        #[clap(long)]
        car_model: Option<String>,

        /// Price
        #[clap(long)]
        price: Option<String>,

        /// Stock quantity
        #[clap(long)]
        stock: Option<String>,
    },

    /// Pick a part from the list and edit it
    Select,

    /// Delete a spare part
    Del {
        /// Part ID of the part to delete
        part_id: String,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Database management
    #[clap(subcommand)]
    Db(DbCommand),
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Print the database path and statistics
    Stats,

    /// Copy the inventory into another database file
    Migrate {
        /// Destination file (.yaml or .db)
        dest: PathBuf,
    },

    /// Export the inventory as JSON
    Export {
        /// Output JSON file
        output: PathBuf,
    },

    /// Replace the inventory with the contents of a JSON file
    Import {
        /// Input JSON file
        input: PathBuf,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}
