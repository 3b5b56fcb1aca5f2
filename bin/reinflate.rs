// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use clap::Parser;
use polymarket_codec::reinflate_file;
use tracing_subscriber::EnvFilter;

/// Reinflates compact Polymarket V3/legacy logs back into JSON.
#[derive(Debug, Parser)]
#[clap(version, about, author)]
struct Opt {
    /// Input file path (mixed V3, legacy, or wrapped records).
    #[arg(long = "in")]
    input: PathBuf,

    /// Output file path.
    #[arg(long = "out")]
    output: PathBuf,

    /// Write a single JSON array instead of newline-delimited JSON.
    #[arg(long)]
    array: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opt = Opt::parse();
    reinflate_file(&opt.input, &opt.output, opt.array)?;
    Ok(())
}
