//! Topology scanner: find which connector pins a key press joins.
//!
//! Every enabled pin is grounded in turn while every other enabled pin on one
//! side of it is read through its pull-up. A low read means the two pins are
//! joined; the pair is typed into the host's editor as `TAB outer TAB inner`
//! (1-based connector numbers) and the scanner waits for the pair to let go.
//! The leading TAB separates the pins from the key name the operator types at
//! the start of each line, so an unnamed line reads `\t3\t9` and a short on it
//! reads `# \t3\t9\tShorted`.
//! A pair still joined after `max_hold_ms` is a short: the line is commented
//! out and tagged `Shorted`, and both pins are left out of every later probe.

use core::ops::Range;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::board::Board;
use crate::config::ScannerConfig;
use crate::keycode::Keycode;
use crate::pins::{PinBank, PinMode};
use crate::transport::{wait_polling, KeyboardTransport};
use crate::typist::Typist;

/// Largest connector any supported board has.
pub const MAX_FPC_PINS: usize = 34;

/// Probe order. Forward grounds lower pins and reads higher ones; reverse
/// does the opposite, so a diode in the matrix conducts in one of the two.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Walk `range` in this direction.
    fn walk(self, range: Range<usize>) -> impl Iterator<Item = usize> {
        let (up, down) = match self {
            Direction::Forward => (Some(range), None),
            Direction::Reverse => (None, Some(range.rev())),
        };
        up.into_iter().flatten().chain(down.into_iter().flatten())
    }
}

/// Outcome of one detected connection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Connection {
    /// Joined, then released in time: a key press.
    Released,
    /// Still joined after the hold limit.
    Shorted,
}

pub struct TopologyScanner {
    board: Board,
    config: ScannerConfig,
    /// Per connector pin (0-based). Only ever goes from enabled to disabled.
    enabled: [bool; MAX_FPC_PINS],
    scans: u16,
    heartbeat: bool,
}

impl TopologyScanner {
    pub fn new(board: Board, config: ScannerConfig) -> Self {
        Self {
            board,
            config,
            enabled: [false; MAX_FPC_PINS],
            scans: 0,
            heartbeat: false,
        }
    }

    /// Connector pin indices (0-based) covered by the configuration.
    fn pin_range(&self) -> Range<usize> {
        let map = self.board.fpc_map();
        let first = usize::from(self.config.first_pin.max(1)) - 1;
        let last = usize::from(self.config.last_pin)
            .min(map.len())
            .min(MAX_FPC_PINS);
        first..last.max(first)
    }

    /// Wait for the host, pull every probed pin up, and type the board name.
    pub fn init<P, D, H>(&mut self, pins: &mut P, delay: &mut D, hid: &mut H)
    where
        P: PinBank,
        D: DelayNs,
        H: KeyboardTransport,
    {
        wait_polling(delay, hid, self.config.startup_delay_ms);

        let map = self.board.fpc_map();
        for index in self.pin_range() {
            pins.set_pin(map[index], PinMode::PullUp);
            self.enabled[index] = true;
        }

        info!("scanning FPC pins {}..={}", self.config.first_pin, self.config.last_pin);
        Typist::new(hid, delay, self.config.host).identify(self.board);
    }

    /// One full iteration of the main loop: probe, blink, sleep.
    pub fn run_cycle<P, D, H>(&mut self, pins: &mut P, delay: &mut D, hid: &mut H)
    where
        P: PinBank,
        D: DelayNs,
        H: KeyboardTransport,
    {
        self.scan_pass(Direction::Forward, pins, delay, hid);
        if self.config.diodes {
            self.scan_pass(Direction::Reverse, pins, delay, hid);
        }
        self.beat(pins);
        wait_polling(delay, hid, self.config.cycle_delay_ms);
    }

    /// Ground each enabled outer pin and read the enabled pins beyond it.
    pub fn scan_pass<P, D, H>(
        &mut self,
        direction: Direction,
        pins: &mut P,
        delay: &mut D,
        hid: &mut H,
    ) where
        P: PinBank,
        D: DelayNs,
        H: KeyboardTransport,
    {
        let map = self.board.fpc_map();
        let range = self.pin_range();
        let outers = match direction {
            Direction::Forward => range.start..range.end.saturating_sub(1),
            Direction::Reverse => (range.start + 1).min(range.end)..range.end,
        };

        for outer in direction.walk(outers) {
            if !self.enabled[outer] {
                continue;
            }
            pins.set_pin(map[outer], PinMode::DriveLow);

            let inners = match direction {
                Direction::Forward => outer + 1..range.end,
                Direction::Reverse => range.start..outer,
            };
            for inner in direction.walk(inners) {
                if !self.enabled[inner] {
                    continue;
                }
                delay.delay_us(self.config.settle_us);
                if pins.read(map[inner]).is_low() {
                    self.report_connection(outer, inner, pins, delay, hid);
                }
                if !self.enabled[outer] {
                    break;
                }
            }

            pins.set_pin(map[outer], PinMode::PullUp);
        }
    }

    /// Type the pair, then wait for it to release or be declared a short.
    fn report_connection<P, D, H>(
        &mut self,
        outer: usize,
        inner: usize,
        pins: &mut P,
        delay: &mut D,
        hid: &mut H,
    ) -> Connection
    where
        P: PinBank,
        D: DelayNs,
        H: KeyboardTransport,
    {
        let (outer_pin, inner_pin) = (outer as u16 + 1, inner as u16 + 1);
        info!("FPC pins {} and {} joined", outer_pin, inner_pin);

        let mut typist = Typist::new(hid, delay, self.config.host);
        typist.tap(Keycode::Tab);
        typist.type_number(outer_pin);
        typist.tap(Keycode::Tab);
        typist.type_number(inner_pin);
        drop(typist);

        let connection = self.hold(self.board.fpc_map()[inner], pins, delay, hid);

        let mut typist = Typist::new(hid, delay, self.config.host);
        if connection == Connection::Shorted {
            warn!("FPC pins {} and {} are shorted", outer_pin, inner_pin);
            typist.to_sol();
            typist.type_str("# ");
            typist.to_eol();
            typist.tap(Keycode::Tab);
            typist.type_str("Shorted");
            self.enabled[outer] = false;
            self.enabled[inner] = false;
        }
        typist.next_line();

        connection
    }

    /// Poll the inner pin once per millisecond until it reads high again or
    /// the hold limit runs out.
    fn hold<P, D, H>(&self, inner_pin: u8, pins: &mut P, delay: &mut D, hid: &mut H) -> Connection
    where
        P: PinBank,
        D: DelayNs,
        H: KeyboardTransport,
    {
        let mut held_ms = 0;
        while pins.read(inner_pin).is_low() {
            if held_ms >= self.config.max_hold_ms {
                return Connection::Shorted;
            }
            delay.delay_ms(1);
            hid.poll();
            held_ms += 1;
        }
        Connection::Released
    }

    /// Toggle the heartbeat LED every `heartbeat_every` full scans.
    fn beat<P: PinBank>(&mut self, pins: &mut P) {
        self.scans += 1;
        if self.scans < self.config.heartbeat_every {
            return;
        }
        self.scans = 0;
        self.heartbeat = !self.heartbeat;
        if let Some(pin) = self.config.heartbeat_pin {
            pins.set_output(pin, self.heartbeat);
        }
    }

    /// Whether a connector pin (1-based) is still being probed.
    pub fn is_enabled(&self, fpc_pin: u8) -> bool {
        match usize::from(fpc_pin).checked_sub(1) {
            Some(index) => self.enabled.get(index).copied().unwrap_or(false),
            None => false,
        }
    }

    pub fn heartbeat(&self) -> bool {
        self.heartbeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostOs;
    use crate::testing::{rig, Editor, MockDelay, MockHid, MockMatrix};

    /// Physical Teensy 2.0 pin for a 1-based connector pin.
    fn phys(fpc_pin: usize) -> u8 {
        Board::Teensy2.fpc_map()[fpc_pin - 1]
    }

    fn config() -> ScannerConfig {
        ScannerConfig {
            startup_delay_ms: 0,
            ..ScannerConfig::for_board(Board::Teensy2)
        }
    }

    struct Bench {
        scanner: TopologyScanner,
        pins: MockMatrix,
        delay: MockDelay,
        hid: MockHid,
    }

    impl Bench {
        fn new(config: ScannerConfig) -> Self {
            let (pins, delay, hid) = rig();
            let mut bench = Self {
                scanner: TopologyScanner::new(Board::Teensy2, config),
                pins,
                delay,
                hid,
            };
            bench
                .scanner
                .init(&mut bench.pins, &mut bench.delay, &mut bench.hid);
            bench
        }

        fn cycle(&mut self) {
            self.scanner
                .run_cycle(&mut self.pins, &mut self.delay, &mut self.hid);
        }

        fn transcript(&self, initial: &[&str]) -> Editor {
            Editor::replay(initial, &self.hid.reports)
        }
    }

    #[test]
    fn identifies_board_on_init() {
        let bench = Bench::new(config());
        let editor = bench.transcript(&["?", "Esc"]);
        assert_eq!(editor.lines, ["Teensy2", "Esc"]);
        assert!(bench.scanner.is_enabled(1));
        assert!(bench.scanner.is_enabled(24));
        assert!(!bench.scanner.is_enabled(25));
        assert_eq!(bench.pins.mode(phys(24)), PinMode::PullUp);
    }

    #[test]
    fn startup_waits_for_host() {
        let config = ScannerConfig {
            startup_delay_ms: 5000,
            ..config()
        };
        let bench = Bench::new(config);
        assert!(bench.delay.now_us() >= 5_000_000);
        assert!(bench.hid.polls >= 5000);
    }

    #[test]
    fn key_press_is_typed_on_its_line() {
        let mut bench = Bench::new(config());
        let now = bench.delay.now_ms();
        bench.pins.join_for(phys(3), phys(9), now, 400);
        bench.cycle();

        let editor = bench.transcript(&["", "KEY_A", "KEY_B"]);
        assert_eq!(editor.lines, ["Teensy2", "KEY_A\t3\t9", "KEY_B"]);
        assert_eq!(editor.cursor, (2, 5));
        assert!(bench.scanner.is_enabled(3));
        assert!(bench.scanner.is_enabled(9));

        // Released: the next cycle is silent.
        let reports = bench.hid.reports.len();
        bench.cycle();
        assert_eq!(bench.hid.reports.len(), reports);
    }

    #[test]
    fn held_pair_becomes_short() {
        let mut bench = Bench::new(config());
        bench.pins.join(phys(3), phys(9));
        bench.cycle();

        let editor = bench.transcript(&["", "KEY_A", "KEY_B"]);
        assert_eq!(editor.lines, ["Teensy2", "# KEY_A\t3\t9\tShorted", "KEY_B"]);
        assert!(!bench.scanner.is_enabled(3));
        assert!(!bench.scanner.is_enabled(9));
        assert!(bench.scanner.is_enabled(4));
    }

    #[test]
    fn short_reported_exactly_once() {
        let mut bench = Bench::new(config());
        bench.pins.join(phys(3), phys(9));
        for _ in 0..3 {
            bench.cycle();
        }
        let editor = bench.transcript(&["", "KEY_A", "KEY_B", "KEY_C"]);
        assert_eq!(
            editor.lines,
            ["Teensy2", "# KEY_A\t3\t9\tShorted", "KEY_B", "KEY_C"]
        );
    }

    #[test]
    fn disabled_pins_are_never_probed_again() {
        let mut bench = Bench::new(ScannerConfig {
            diodes: true,
            ..config()
        });
        bench.pins.join(phys(3), phys(9));
        bench.cycle();
        assert!(!bench.scanner.is_enabled(3));

        bench.pins.clear_log();
        bench.pins.split(phys(3), phys(9));
        for _ in 0..2 {
            bench.cycle();
        }
        for pin in [phys(3), phys(9)] {
            assert!(!bench.pins.driven_low.contains(&pin), "pin {pin} driven");
            assert!(!bench.pins.reads.contains(&pin), "pin {pin} read");
        }
        assert!(bench.pins.driven_low.contains(&phys(4)));
    }

    #[test]
    fn short_times_out_after_hold_limit() {
        let mut bench = Bench::new(ScannerConfig {
            max_hold_ms: 50,
            ..config()
        });
        bench.pins.join(phys(1), phys(2));
        bench.cycle();
        assert!(!bench.scanner.is_enabled(1));

        // Still joined just under the limit: only a key press.
        let mut bench = Bench::new(ScannerConfig {
            max_hold_ms: 50,
            ..config()
        });
        let now = bench.delay.now_ms();
        // Typing "\t1\t2" takes four taps before the hold timer starts.
        let typing = 4 * crate::typist::TAP_MS as u64;
        bench.pins.join_for(phys(1), phys(2), now, typing + 40);
        bench.cycle();
        assert!(bench.scanner.is_enabled(1));
        assert!(bench.scanner.is_enabled(2));
    }

    #[test]
    fn reverse_pass_reports_higher_pin_first() {
        let mut bench = Bench::new(ScannerConfig {
            diodes: true,
            ..config()
        });
        // A diode only conducts when pin 9 is grounded and pin 3 is read.
        let now = bench.delay.now_ms();
        bench.pins.join_directed_for(phys(9), phys(3), now, 300);
        bench.cycle();

        let editor = bench.transcript(&["", "KEY_A", ""]);
        assert_eq!(editor.lines, ["Teensy2", "KEY_A\t9\t3", ""]);
    }

    #[test]
    fn forward_only_without_diodes() {
        let mut bench = Bench::new(config());
        bench.pins.join_directed(phys(9), phys(3));
        bench.cycle();
        let editor = bench.transcript(&["", "KEY_A"]);
        assert_eq!(editor.lines, ["Teensy2", "KEY_A"]);
    }

    #[test]
    fn outer_pins_restored_after_pass() {
        let mut bench = Bench::new(config());
        bench.cycle();
        for fpc_pin in 1..=24 {
            assert_eq!(bench.pins.mode(phys(fpc_pin)), PinMode::PullUp);
        }
    }

    #[test]
    fn heartbeat_toggles_every_ten_scans() {
        let mut bench = Bench::new(config());
        let led = Board::Teensy2.led_pin();
        for _ in 0..9 {
            bench.cycle();
        }
        assert!(!bench.scanner.heartbeat());
        bench.cycle();
        assert!(bench.scanner.heartbeat());
        assert_eq!(bench.pins.mode(led), PinMode::DriveHigh);
        for _ in 0..10 {
            bench.cycle();
        }
        assert_eq!(bench.pins.mode(led), PinMode::DriveLow);
    }

    #[test]
    fn pin_window_limits_probing() {
        let mut bench = Bench::new(ScannerConfig {
            first_pin: 5,
            last_pin: 10,
            ..config()
        });
        assert!(!bench.scanner.is_enabled(4));
        assert!(bench.scanner.is_enabled(5));
        assert!(bench.scanner.is_enabled(10));
        assert!(!bench.scanner.is_enabled(11));

        bench.pins.clear_log();
        bench.cycle();
        assert!(!bench.pins.reads.contains(&phys(11)));
        assert!(!bench.pins.driven_low.contains(&phys(4)));
    }

    #[test]
    fn mac_transcript_matches() {
        let mut bench = Bench::new(ScannerConfig {
            host: HostOs::Mac,
            ..config()
        });
        bench.pins.join(phys(3), phys(9));
        bench.cycle();
        let editor = bench.transcript(&["", "KEY_A", ""]);
        assert_eq!(editor.lines, ["Teensy2", "# KEY_A\t3\t9\tShorted", ""]);
    }
}
