//! Interactive operator console: read-only views of the interface FSM plus
//! administrative event injection. Commands may be abbreviated to any
//! unambiguous prefix; `?` lists what is available.

use std::collections::HashMap;
use std::process::exit;
use std::sync::{Mutex, OnceLock};

use lazy_static::lazy_static;
use trie_rs::{Trie, TrieBuilder};

use crate::interface::InterfaceEvent;
use crate::{guard, log, router};

struct CommandSet {
    /// supported commands
    trie: Trie<u8>,
    /// command descriptions
    desc: HashMap<&'static str, &'static str>,
    /// handler for the command
    handlers: HashMap<&'static str, Box<dyn Fn() -> &'static CommandSet + Sync>>,
    /// handler for running this command
    handle_enter: Option<Box<dyn Fn() + Sync>>,
    /// handler for the command with arbitrary argument
    arbitrary: Option<Box<dyn Fn(&str) -> &'static CommandSet + Sync>>,
}

impl CommandSet {
    fn new(
        desc: HashMap<&'static str, &'static str>,
        handlers: HashMap<&'static str, Box<dyn Fn() -> &'static CommandSet + Sync>>,
        handle_enter: Option<Box<dyn Fn() + Sync>>,
        arbitrary: Option<Box<dyn Fn(&str) -> &'static CommandSet + Sync>>,
    ) -> Self {
        let mut builder = TrieBuilder::new();
        desc.keys()
            .filter(|s| !s.starts_with("<"))
            .for_each(|&s| builder.push(s));
        CommandSet {
            trie: builder.build(),
            desc,
            handlers,
            handle_enter,
            arbitrary,
        }
    }
}

macro_rules! command {
    (
        $(enter: ($ve:literal) => $fe:expr;)? // action for a bare <enter>
        $(arg: $ka:literal ($va:literal) => $fa:expr;)? // arbitrary-argument branch
        $($k:literal ($v:literal) => $f:expr;)* // fixed keywords
    ) => { #[allow(unused_mut, unused_assignments)] {
        let mut desc = HashMap::<&str, &str>::new();
        let mut handlers = HashMap::<&str, Box<dyn Fn() -> &'static CommandSet + Sync>>::new();
        let mut handle_enter = Option::<Box<dyn Fn() + Sync>>::None;
        let mut arbitrary = Option::<Box<dyn Fn(&str) -> &'static CommandSet + Sync>>::None;
        $(
            desc.insert("<enter>", $ve);
            handle_enter = Some(Box::new($fe));
        )?
        $(
            desc.insert($ka, $va);
            arbitrary = Some(Box::new($fa));
        )?
        $(
            desc.insert($k, $v);
            handlers.insert($k, Box::new($f));
        )*
        CommandSet::new(desc, handlers, handle_enter, arbitrary)
    }};
}

lazy_static! {
    static ref ROOT: CommandSet = command! {
        enter: ("run nothing") => || {};
        "display"("display something...") => parse_display;
        "interface"("inject an interface event...") => parse_interface;
        "exit"("exit ifsmd") => parse_exit;
    };
}

pub static RUNTIME: OnceLock<tokio::runtime::Handle> = OnceLock::new();

macro_rules! error {
    ($raw:expr, $cur:expr, $msg:expr) => {{
        let idx = unsafe { $cur.as_ptr().offset_from($raw.as_ptr()) } as usize;
        crate::log_error!("{}\n{}^ {}", $raw, " ".repeat(idx), $msg);
        return;
    }};
}

fn display_help(desc: &HashMap<&str, &str>) {
    let max_key_len = desc.keys().map(|s| s.len()).max().unwrap();
    let mut vec: Vec<_> = desc.iter().collect();
    vec.sort_by_key(|(&k, _)| k);
    for (k, v) in vec {
        crate::log!("  {:<width$} - {}", k, v, width = max_key_len);
    }
}

pub fn parse_cmd(raw: String) {
    let raw = raw.trim();
    let mut list = raw.split_ascii_whitespace();
    let mut set: &CommandSet = &ROOT;
    while let Some(cmd) = list.next() {
        if cmd == "?" {
            display_help(&set.desc);
            return;
        }
        let (cmd, q) = if cmd.ends_with("?") {
            (&cmd[..cmd.len() - 1], true)
        } else {
            (cmd, false)
        };
        let matches: Vec<String> = set.trie.predictive_search(cmd).collect();
        if matches.is_empty() {
            if let Some(ref hd) = set.arbitrary {
                set = hd(cmd);
            } else {
                error!(raw, cmd, "bad command");
            }
        } else if q {
            display_help(
                &matches
                    .into_iter()
                    .map(|s| set.desc.get_key_value(s.as_str()).unwrap())
                    .map(|(&k, &v)| (k, v))
                    .collect(),
            );
            return;
        } else if matches.len() > 1 {
            error!(raw, cmd, "ambiguous command");
        } else {
            set = set.handlers.get(matches[0].as_str()).unwrap()();
        }
    }
    if let Some(ref hd) = set.handle_enter {
        hd();
    } else {
        error!(raw, raw[raw.len() - 1..], "bad command");
    }
}

macro_rules! block_on {
    ($e:expr) => {
        RUNTIME.get().unwrap().block_on($e)
    };
}

fn parse_display() -> &'static CommandSet {
    lazy_static! {
        static ref DISPLAY: CommandSet = command! {
            "interface"("display interface states") => parse_display_interface;
            "neighbors"("display ospf neighbors") => parse_display_neighbors;
        };
    };
    &DISPLAY
}

fn parse_display_interface() -> &'static CommandSet {
    lazy_static! {
        static ref DISPLAY: CommandSet = command! {
            enter: ("display interface states") => || {
                log!("\tOSPF with Router ID: {}", router::router_id());
                log!("\t\tInterfaces");
                for interface in router::interfaces() {
                    log!("{}", *block_on!(interface.read()));
                }
            };
        };
    };
    &DISPLAY
}

fn parse_display_neighbors() -> &'static CommandSet {
    lazy_static! {
        static ref DISPLAY: CommandSet = command! {
            enter: ("display ospf neighbors") => || {
                log!("\tOSPF with Router ID: {}", router::router_id());
                log!("\t\tNeighbors");
                for interface in router::interfaces() {
                    let interface = block_on!(interface.read());
                    log!("interface {}({})'s neighbors", interface.name, interface.ip_addr);
                    interface.neighbors.values().for_each(|n| log!("{}", n));
                }
            };
        };
    };
    &DISPLAY
}

/// The interface named in the command line being parsed.
static SELECTED: Mutex<String> = Mutex::new(String::new());

fn with_selected(f: impl FnOnce(crate::interface::AInterface)) {
    let name = SELECTED.lock().unwrap().clone();
    guard!(Some(interface) = block_on!(router::interface_by_name(&name));
        error: "bad interface name: {name}");
    f(interface);
}

fn parse_interface() -> &'static CommandSet {
    lazy_static! {
        static ref IFACE: CommandSet = command! {
            arg: "<iface_name>"("inject an interface event...") => |name| {
                *SELECTED.lock().unwrap() = name.to_string();
                parse_interface_event()
            };
        };
    };
    &IFACE
}

fn parse_interface_event() -> &'static CommandSet {
    lazy_static! {
        static ref EVENTS: CommandSet = command! {
            "up"("deliver InterfaceUp") => parse_event_up;
            "down"("deliver InterfaceDown") => parse_event_down;
            "loop"("deliver LoopInd") => parse_event_loop;
            "unloop"("deliver UnloopInd") => parse_event_unloop;
        };
    };
    &EVENTS
}

macro_rules! event_command {
    ($name:ident, $desc:literal, $event:ident) => {
        fn $name() -> &'static CommandSet {
            lazy_static! {
                static ref SET: CommandSet = command! {
                    enter: ($desc) => || with_selected(|interface| {
                        block_on!(interface.$event());
                    });
                };
            };
            &SET
        }
    };
}

event_command!(parse_event_up, "deliver InterfaceUp", interface_up);
event_command!(parse_event_down, "deliver InterfaceDown", interface_down);
event_command!(parse_event_loop, "deliver LoopInd", loop_ind);
event_command!(parse_event_unloop, "deliver UnloopInd", unloop_ind);

fn parse_exit() -> &'static CommandSet {
    lazy_static! {
        static ref EXIT: CommandSet = command! {
            enter: ("exit ifsmd") => || {
                for interface in router::interfaces() {
                    block_on!(interface.clone().interface_down());
                }
                exit(0);
            };
        };
    };
    &EXIT
}
