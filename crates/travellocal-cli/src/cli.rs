use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use travellocal_core::sort::{ProgramSort, ReviewSort};

#[derive(Parser)]
#[command(name = "travellocal")]
#[command(about = "Browse tour programs, reviews and bookings from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the most wishlisted tour programs
    Recommend {
        /// Hashtag filter, repeatable (defaults to the preferred hashtags)
        #[arg(long = "hashtag", value_name = "TAG")]
        hashtags: Vec<String>,
        /// Region filter, repeatable (defaults to the Chungnam regions)
        #[arg(long = "region", value_name = "REGION")]
        regions: Vec<String>,
        /// Server-side order of the candidate list
        #[arg(long, value_enum)]
        sort: Option<ProgramSortArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List reviews of a tour program or a place
    Reviews {
        #[command(subcommand)]
        target: ReviewTarget,
    },
    /// Write or remove a review
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
    /// Inspect or unlock a tour program
    Program {
        #[command(subcommand)]
        command: ProgramCommands,
    },
    /// Prepare a reservation for a tour program
    Reserve {
        /// Tour program ID
        program_id: i64,
        /// Tour date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date: NaiveDate,
        /// Number of people
        #[arg(long, default_value = "1")]
        people: u32,
    },
    /// Manage the stored access token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ReviewTarget {
    /// Reviews of a tour program
    Tour {
        /// Tour program ID
        program_id: i64,
        /// Review order
        #[arg(long, value_enum, default_value_t = SortArg::Latest)]
        sort: SortArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reviews of a place, with rating statistics
    Place {
        /// Google place ID
        place_id: String,
        /// Review order
        #[arg(long, value_enum, default_value_t = SortArg::Latest)]
        sort: SortArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Submit a new review
    Add {
        #[command(subcommand)]
        target: ReviewAddTarget,
    },
    /// Delete one of your reviews
    Delete {
        #[command(subcommand)]
        target: ReviewDeleteTarget,
    },
}

#[derive(clap::Args, Clone, Debug)]
pub struct ReviewInput {
    /// Rating from 1 to 5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: u8,
    /// Review text
    #[arg(long)]
    pub content: String,
    /// Optional image URL
    #[arg(long, value_name = "URL")]
    pub image_url: Option<String>,
}

#[derive(Subcommand)]
pub enum ReviewAddTarget {
    /// Review a tour program
    Tour {
        /// Tour program ID
        program_id: i64,
        #[command(flatten)]
        input: ReviewInput,
    },
    /// Review a place
    Place {
        /// Google place ID
        place_id: String,
        #[command(flatten)]
        input: ReviewInput,
    },
}

#[derive(Subcommand)]
pub enum ReviewDeleteTarget {
    /// Delete a tour program review
    Tour {
        /// Tour program ID
        program_id: i64,
        /// Review ID
        review_id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete a place review
    Place {
        /// Google place ID
        place_id: String,
        /// Review ID
        review_id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ProgramCommands {
    /// Show program detail and itinerary
    Show {
        /// Tour program ID
        program_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Spend points to unlock the detailed itinerary
    Unlock {
        /// Tour program ID
        program_id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an access token in the system keychain
    SetToken {
        /// Access token, with or without the `Bearer ` prefix
        token: String,
    },
    /// Show whether a token is stored and for whom
    Status,
    /// Remove the stored token and cached identity
    Logout,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    Latest,
    Rating,
    LowRating,
}

impl From<SortArg> for ReviewSort {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Latest => Self::Latest,
            SortArg::Rating => Self::HighestRating,
            SortArg::LowRating => Self::LowestRating,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProgramSortArg {
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    Reviews,
    Wishlist,
}

impl From<ProgramSortArg> for ProgramSort {
    fn from(value: ProgramSortArg) -> Self {
        match value {
            ProgramSortArg::Newest => Self::AddedDesc,
            ProgramSortArg::Oldest => Self::AddedAsc,
            ProgramSortArg::PriceLow => Self::PriceAsc,
            ProgramSortArg::PriceHigh => Self::PriceDesc,
            ProgramSortArg::Reviews => Self::ReviewDesc,
            ProgramSortArg::Wishlist => Self::WishlistDesc,
        }
    }
}
