use clap::{Args, Parser, Subcommand};
use valuation_core::Assumptions;

#[derive(Parser, Debug)]
#[command(name = "value-calc", version, about = "Five-year intrinsic value calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print machine-readable JSON instead of the text report
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a ticker and value it with the given assumptions
    Analyze {
        ticker: String,

        #[command(flatten)]
        assumptions: AssumptionArgs,

        /// Save the result to the watchlist
        #[arg(long)]
        save: bool,
    },

    /// Look up tickers by company name or symbol
    Search { query: String },

    /// Manage saved analyses
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    /// Show saved analyses with their verdict at save time
    List,

    /// Re-run a saved analysis with its stored assumptions
    Open { ticker: String },

    /// Delete a saved analysis
    Remove { ticker: String },
}

/// Assumptions in the units people type: percent for rates, a plain multiple for P/E.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct AssumptionArgs {
    /// Expected EPS growth, percent per year
    #[arg(long, allow_hyphen_values = true)]
    pub cagr: Option<f64>,

    /// Exit P/E for the earnings method
    #[arg(long)]
    pub pe: Option<f64>,

    /// Expected book value growth, percent per year
    #[arg(long, allow_hyphen_values = true)]
    pub bvps_cagr: Option<f64>,

    /// Return on equity in year five, percent
    #[arg(long)]
    pub roe: Option<f64>,

    /// Exit P/E for the book value method
    #[arg(long)]
    pub pe_bv: Option<f64>,
}

impl AssumptionArgs {
    /// Converts percents to fractions. Unset flags stay unset.
    pub fn to_assumptions(self) -> Assumptions {
        Assumptions {
            expected_cagr: self.cagr.map(|v| v / 100.0),
            expected_pe: self.pe,
            expected_bvps_cagr: self.bvps_cagr.map(|v| v / 100.0),
            expected_roe: self.roe.map(|v| v / 100.0),
            expected_pe_bv: self.pe_bv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_with_assumptions() {
        let cli = Cli::try_parse_from([
            "value-calc", "analyze", "aapl", "--cagr", "8", "--pe", "20", "--bvps-cagr", "-2.5",
            "--roe", "15", "--save",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { ticker, assumptions, save } => {
                assert_eq!(ticker, "aapl");
                assert!(save);
                let a = assumptions.to_assumptions();
                assert_eq!(a.expected_cagr, Some(0.08));
                assert_eq!(a.expected_pe, Some(20.0));
                assert_eq!(a.expected_bvps_cagr, Some(-0.025));
                assert_eq!(a.expected_roe, Some(0.15));
                assert_eq!(a.expected_pe_bv, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_watchlist_commands() {
        let cli = Cli::try_parse_from(["value-calc", "--json", "watchlist", "remove", "KO"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Watchlist { action: WatchlistAction::Remove { ref ticker } } if ticker == "KO"
        ));
    }
}
