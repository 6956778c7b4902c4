// CLI definitions using clap

use clap::Parser;
use std::path::PathBuf;

const RULE_HELP: &str = "\
Mapping rules:
  Button: <midi channel>,<data1 min>-<data1 max>,<joystick>,<button offset>
          <midi channel>,<data1>,<joystick>,<button offset>
  Axis:   <midi channel>,<data1>,<joystick>,<axis (x,y,z,rx,ry,rz,sl0,sl1)>

Example:
  midi2joy 0,23-31,1,-22 0,33-41,1,-22 0,14,1,x 0,15,1,y 0,16,1,z \\
           0,17,1,rx 0,18,1,ry 0,19,1,rz 0,20,1,sl0 0,21,1,sl1";

#[derive(Parser, Debug)]
#[command(name = "midi2joy")]
#[command(author, version, about = "MIDI to virtual joystick converter")]
#[command(after_help = RULE_HELP)]
pub struct Cli {
    /// Mapping rules, added after the ones from the config file
    #[arg(value_name = "RULE")]
    pub rules: Vec<String>,

    /// Config file path (default: ~/.config/midi2joy/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only open MIDI inputs whose name contains this text (repeatable)
    #[arg(short, long = "port", value_name = "NAME")]
    pub ports: Vec<String>,

    /// Name prefix for the virtual joysticks
    #[arg(long)]
    pub device_name: Option<String>,

    /// Log joystick commands instead of creating virtual devices
    #[arg(long)]
    pub dry_run: bool,

    /// List MIDI input ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Validate the mapping, print it and exit without touching any device
    #[arg(long)]
    pub check: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
