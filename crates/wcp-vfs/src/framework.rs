//! Project frameworks and their seed templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VfsError;

/// A `(path, content)` pair used to seed a new workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    pub path: String,
    pub content: String,
}

impl SeedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Language the build projection patches program identifiers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    Rust,
    Python,
}

/// The closed set of project templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Native,
    Anchor,
    Seahorse,
}

pub const SOURCE_DIR: &str = "/src/";

const NATIVE_LIB: &str = r#"use solana_program::{
    account_info::AccountInfo, entrypoint, entrypoint::ProgramResult, msg, pubkey::Pubkey,
};

entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    _accounts: &[AccountInfo],
    _instruction_data: &[u8],
) -> ProgramResult {
    msg!("Hello from {}", program_id);
    Ok(())
}
"#;

const ANCHOR_LIB: &str = r#"use anchor_lang::prelude::*;

declare_id!("11111111111111111111111111111111");

#[program]
mod hello {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, data: u64) -> Result<()> {
        ctx.accounts.new_account.data = data;
        msg!("Changed data to: {}!", data);
        Ok(())
    }
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(init, payer = signer, space = 8 + 8)]
    pub new_account: Account<'info, NewAccount>,
    #[account(mut)]
    pub signer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[account]
pub struct NewAccount {
    data: u64,
}
"#;

const SEAHORSE_MAIN: &str = r#"from seahorse.prelude import *

declare_id('11111111111111111111111111111111')


class Counter(Account):
    owner: Pubkey
    count: u64


@instruction
def init_counter(owner: Signer, counter: Empty[Counter]):
    counter = counter.init(payer=owner, seeds=['counter', owner])
    counter.owner = owner.key()


@instruction
def increment(owner: Signer, counter: Counter):
    assert owner.key() == counter.owner, 'This is not your counter!'
    counter.count += 1
"#;

impl Framework {
    pub const ALL: [Framework; 3] = [Framework::Native, Framework::Anchor, Framework::Seahorse];

    pub fn name(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Anchor => "anchor",
            Self::Seahorse => "seahorse",
        }
    }

    pub fn language(self) -> SourceLanguage {
        match self {
            Self::Native | Self::Anchor => SourceLanguage::Rust,
            Self::Seahorse => SourceLanguage::Python,
        }
    }

    /// Directory that holds compile inputs and sorts first in listings.
    pub fn source_dir(self) -> &'static str {
        SOURCE_DIR
    }

    /// Extensions that are sent to the build service.
    pub fn source_extensions(self) -> &'static [&'static str] {
        match self.language() {
            SourceLanguage::Rust => &["rs"],
            SourceLanguage::Python => &["py"],
        }
    }

    /// Fixed seed files for a new workspace of this kind.
    pub fn template(self) -> Vec<SeedFile> {
        match self {
            Self::Native => vec![SeedFile::new("/src/lib.rs", NATIVE_LIB)],
            Self::Anchor => vec![SeedFile::new("/src/lib.rs", ANCHOR_LIB)],
            Self::Seahorse => vec![SeedFile::new("/src/counter.py", SEAHORSE_MAIN)],
        }
    }

    /// File opened in a tab when the template seeds a workspace.
    pub fn default_open_file(self) -> &'static str {
        match self {
            Self::Native | Self::Anchor => "/src/lib.rs",
            Self::Seahorse => "/src/counter.py",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Framework {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| VfsError::InvalidName(s.to_string()))
    }
}

/// Starting content for a new file that was created without any.
pub fn default_content(extension: Option<&str>) -> &'static str {
    match extension {
        Some("json") => "{}\n",
        Some("py") => "from seahorse.prelude import *\n",
        _ => "",
    }
}
