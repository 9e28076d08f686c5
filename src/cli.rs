use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::launch::DEFAULT_TEMPLATE;
use crate::lock::default_lock_path;
use crate::naming::Naming;
use crate::split::SplitMode;
use crate::wm::tree::UnparsableNumber;

#[derive(Debug, Clone, Parser)]
#[command(name = "marvex")]
#[command(about = "Open a terminal in i3 attached to a persistent tmux session")]
#[command(version)]
pub struct Cli {
    /// Execute specified command in new terminal
    #[arg(short = 'e', value_name = "CMD")]
    pub execute: Option<String>,

    /// Path to terminal binary
    #[arg(short = 'b', value_name = "PATH", default_value = "/usr/bin/urxvt")]
    pub terminal: String,

    /// Window title template (%w: workspace, %n: terminal id)
    #[arg(short = 't', value_name = "TPL", default_value = "marvex-%w-%n")]
    pub title: String,

    /// Send CTRL-L after opening terminal
    #[arg(short = 'c')]
    pub clear: bool,

    /// CTRL-L is only sent if this matches the current command name
    #[arg(long = "clear-re", value_name = "RE", default_value = r"^\w+sh$")]
    pub clear_re: String,

    /// Split the focused window along its longer side
    #[arg(short = 's', long = "smart-split", conflicts_with = "biggest_split")]
    pub smart_split: bool,

    /// Focus and split the biggest window of the workspace
    #[arg(long = "biggest-split")]
    pub biggest_split: bool,

    /// Start the terminal with a placeholder; Enter turns it into a shell,
    /// Escape or CTRL-S closes it
    #[arg(short = 'd')]
    pub dummy: bool,

    /// Do not print the new session name
    #[arg(long)]
    pub quiet: bool,

    /// X window class name
    #[arg(long, value_name = "CLASS", default_value = "")]
    pub class: String,

    /// Number of idle sessions to keep reserved
    #[arg(short = 'r', long = "reserving", value_name = "COUNT", default_value_t = 2)]
    pub reserving: usize,

    /// Lock file serializing concurrent invocations
    #[arg(long, value_name = "FILE", default_value_os_t = default_lock_path())]
    pub lock: PathBuf,

    /// Template for the terminal command line
    #[arg(long = "terminal", value_name = "TEMPLATE", default_value = DEFAULT_TEMPLATE)]
    pub terminal_template: String,

    /// Name of the tmux socket (-L)
    #[arg(long = "tmux-socket", value_name = "NAME")]
    pub tmux_socket: Option<String>,

    /// How new terminal ids are chosen
    #[arg(long, value_enum, default_value_t = Naming::Random)]
    pub naming: Naming,

    /// Titles whose number is not an integer: skip them, or count them as 0
    #[arg(long = "unparsable-number", value_enum, default_value_t = UnparsableNumber::Skip)]
    pub unparsable_number: UnparsableNumber,

    /// Window manager message binary
    #[arg(long = "wm-msg", value_name = "BIN", default_value = "i3-msg")]
    pub wm_msg: String,

    /// Give up waiting for the terminal to attach after this many milliseconds
    #[arg(long = "attach-timeout-ms", value_name = "MS")]
    pub attach_timeout_ms: Option<u64>,

    /// Be verbose
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn split_mode(&self) -> SplitMode {
        if self.smart_split {
            SplitMode::Smart
        } else if self.biggest_split {
            SplitMode::Biggest
        } else {
            SplitMode::None
        }
    }

    pub fn attach_timeout(&self) -> Option<Duration> {
        self.attach_timeout_ms.map(Duration::from_millis)
    }

    /// Arguments forwarded to the re-executed placeholder process
    pub fn placeholder_args(&self) -> Vec<String> {
        let mut args = vec![
            "-d".to_string(),
            "-r".to_string(),
            self.reserving.to_string(),
            "--lock".to_string(),
            self.lock.to_string_lossy().into_owned(),
        ];
        if let Some(socket) = &self.tmux_socket {
            args.push("--tmux-socket".to_string());
            args.push(socket.clone());
        }
        if self.verbose {
            args.push("-v".to_string());
        }
        args
    }
}
