use phase2_coordinator::{
    coordinator::Coordinator,
    engine::HashChainEngine,
    environment::{Deployment, Environment, Parameters},
    parameters::{LocalOnlyFetcher, ParameterSource},
    storage::Disk,
};

use anyhow::Result;
use std::{path::PathBuf, process};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(name = "phase2-coordinator", about = "Coordinate a sequential Groth16 phase2 trusted setup ceremony")]
struct Opts {
    /// Path to the circuit description consumed by phase2 initialization
    #[structopt(long, default_value = "circuit.r1cs")]
    circuit: PathBuf,

    /// The expected number of contributions
    #[structopt(long, default_value = "3")]
    contributions: u64,

    /// The log2 constraint count selecting the public-parameter file
    #[structopt(long, default_value = "24")]
    power: usize,

    /// The drand round binding phase1 finalization (0 = unset)
    #[structopt(long, env = "DRAND_PHASE1_ROUND", default_value = "0")]
    phase1_beacon_round: u64,

    /// The drand round binding phase2 finalization (0 = unset)
    #[structopt(long, env = "DRAND_PHASE2_ROUND", default_value = "0")]
    phase2_beacon_round: u64,

    /// The storage bucket identifier
    #[structopt(long)]
    bucket: String,

    /// The local base directory for ceremony state
    #[structopt(long, default_value = "./trusted-setup")]
    base_directory: PathBuf,

    /// The deployment flavor: testing, development, or production
    #[structopt(long, default_value = "development")]
    deployment: Deployment,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Import the public parameters into the phase1 artifact
    ImportPhase1,
    /// Initialize the phase2 base artifact for the circuit
    InitPhase2,
    /// Issue access grants and write per-contributor instruction messages
    IssueGrants {
        /// How many grants to issue
        count: u64,
    },
    /// Perform one contribution for the given index
    Contribute {
        /// The 0-based contribution index
        index: u64,
    },
    /// Verify one contribution by index, in ascending order
    Verify {
        /// The 0-based contribution index
        index: u64,
    },
    /// Walk the entire verification chain from index 0
    VerifyChain,
    /// Extract the proving and verifying key pair
    ExtractKeys,
    /// Drive the full ceremony end to end
    Ceremony,
    /// Report the current ceremony state
    Status,
}

fn execute(opts: Opts) -> Result<()> {
    let parameters = Parameters {
        circuit: opts.circuit,
        contributions: opts.contributions,
        power: opts.power,
        phase1_beacon_round: opts.phase1_beacon_round,
        phase2_beacon_round: opts.phase2_beacon_round,
    };
    let environment = Environment::new(opts.deployment, parameters, opts.bucket, opts.base_directory)?;
    let storage = Disk::load(&environment)?;
    let coordinator = Coordinator::new(environment.clone(), Box::new(storage), Box::new(HashChainEngine::new()));

    // The parameter file must already sit in the local cache; downloading
    // the multi-gigabyte archive is left to the operator.
    let source = ParameterSource::new(&environment, Box::new(LocalOnlyFetcher));

    coordinator.wait_ready()?;

    match opts.command {
        Command::ImportPhase1 => coordinator.import_phase1(&source)?,
        Command::InitPhase2 => coordinator.init_phase2()?,
        Command::IssueGrants { count } => {
            let messages_directory = environment.base_directory().join("messages");
            fs_err::create_dir_all(&messages_directory)?;
            for grant in coordinator.issue_grants(count)? {
                let message = grant.instructions(environment.bucket());
                let path = messages_directory.join(format!("msg{}.txt", grant.ordinal()));
                fs_err::write(&path, &message)?;
                println!("{}: {}", grant.index(), path.display());
            }
        }
        Command::Contribute { index } => {
            let grant = coordinator.issue_grant(index)?;
            let record = coordinator.contribute(&grant)?;
            println!("Contribution successful!");
            println!(
                "Once your contribution has been verified by the coordinator, you can attest for it on social media, providing the following info:"
            );
            println!(" - Contribution: {} (bucket {})", record.locator(), environment.bucket());
            println!(" - Contribution Hash: {}", record.contribution_hash());
        }
        Command::Verify { index } => {
            coordinator.verify(index)?;
            println!("Ok!");
        }
        Command::VerifyChain => {
            coordinator.verify_chain()?;
            println!("Ok!");
        }
        Command::ExtractKeys => coordinator.extract_keys()?,
        Command::Ceremony => coordinator.run(&source)?,
        Command::Status => {
            println!("{:?}", coordinator.current_state()?);
            for record in coordinator.transcript()?.contributions() {
                println!(
                    "contribution #{} -> {} ({})",
                    record.ordinal(),
                    record.locator(),
                    record.contribution_hash()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(error) = execute(Opts::from_args()) {
        eprintln!("{}", error);
        process::exit(1);
    }
}
