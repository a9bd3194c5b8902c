//! Line-oriented terminal front end
//!
//! One public seat-inquiry view and one admin panel share the data service.
//! Each input line is a command; replies are plain text lines.

use banquet_core::{
    parse_attendees, BookingDraft, BookingEdit, BookingStatus, Error, Result, SeatLocation, Table,
    TableTier,
};
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::viewmodel::{
    AdminPanel, PendingAction, SeatInquiryView, LOGIN_REQUIRED_MESSAGE, NO_MATCH_MESSAGE,
    RESET_DONE_MESSAGE, SAVED_MESSAGE,
};

const HELP: &str = "\
Seat inquiry:
  find <name>                       suggest attendee names
  pick <name>                       show where a guest sits
  seats                             seat overview
Admin:
  login <username> <password>       logout
  list [filter]                     bookings, filtered by name, table or contact
  stats                             dashboard figures
  add <table> [status] | <contact> | <names> [| <notes>]
                                    names separated by , or ，
  status <booking> <confirmed|pending|cancelled>
  move <booking> <table>
  names <booking> <names>
  contact <booking> <contact>
  notes <booking> [notes]           no notes clears them
  date <booking> <YYYY-MM-DD>
  delete <booking>                  then yes / no
  price|capacity|location|sponsor <table> <value>
  save                              reconcile and sync
  export                            write bookings CSV
  reset                             restore initial data, then yes / no
help, quit";

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

pub struct Console {
    inquiry: SeatInquiryView,
    admin: AdminPanel,
}

impl Console {
    pub fn new(state: &AppState, suggestions: mpsc::UnboundedSender<Vec<String>>) -> Self {
        let inquiry = SeatInquiryView::mount(state.service.clone(), state.config.debounce())
            .with_suggestion_sink(suggestions);
        let admin = AdminPanel::mount(state.service.clone(), state.gate.clone(), state.export_dir());
        Self { inquiry, admin }
    }

    /// Let both views pick up changes made elsewhere
    pub fn poll(&mut self) {
        self.inquiry.poll_changes();
        self.admin.poll_changes();
    }

    pub fn handle(&mut self, line: &str) -> Flow {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let reply = match command {
            "" => Ok(Vec::new()),
            "quit" | "exit" => return Flow::Quit,
            "help" => Ok(vec![HELP.to_string()]),
            "find" => {
                self.inquiry.set_search_term(rest);
                Ok(Vec::new())
            }
            "pick" => Ok(self.pick(rest)),
            "seats" => Ok(self.seats()),
            "login" => Ok(self.login(rest)),
            "logout" => {
                self.admin.logout();
                Ok(vec!["已退出登录".to_string()])
            }
            "list" => self.list(rest),
            "stats" => self.stats(),
            "add" => self.add(rest),
            "status" => self.set_status(rest),
            "move" => self.move_booking(rest),
            "names" | "contact" | "notes" | "date" => self.edit_details(command, rest),
            "delete" => self.admin.request_delete(rest).map(|prompt| vec![prompt, "(yes / no)".to_string()]),
            "reset" => self.admin.request_reset().map(|prompt| vec![prompt, "(yes / no)".to_string()]),
            "yes" => self.confirm(),
            "no" => {
                self.admin.cancel_pending();
                Ok(vec!["已取消".to_string()])
            }
            "price" | "capacity" | "location" | "sponsor" => self.edit_seat(command, rest),
            "save" => self
                .admin
                .save_all()
                .map(|report| vec![format!("{} ({} 桌已预订)", SAVED_MESSAGE, report.occupied)]),
            "export" => self
                .admin
                .export_csv()
                .map(|path| vec![format!("已导出: {}", path.display())]),
            other => Ok(vec![format!("Unknown command: {} (try help)", other)]),
        };

        Flow::Continue(reply.unwrap_or_else(|e| vec![error_line(&e)]))
    }

    fn pick(&mut self, name: &str) -> Vec<String> {
        match self.inquiry.select_suggestion(name) {
            Some(found) => describe_location(&found),
            None => vec![NO_MATCH_MESSAGE.to_string()],
        }
    }

    fn seats(&self) -> Vec<String> {
        let highlighted = self.inquiry.highlighted_table();
        self.admin
            .seat_overview()
            .iter()
            .map(|entry| {
                let table = entry.table;
                let marker = if highlighted.as_ref() == Some(&table.id) { "*" } else { " " };
                let holder = match entry.occupant {
                    Some(b) => format!("{} ({})", b.attendees.join(", "), b.status.label()),
                    None => "空闲".to_string(),
                };
                format!(
                    "{}{:<5} {:<4} {:>8.0} {:>3}人 {:<8} {}",
                    marker,
                    table.id,
                    table.kind().label(),
                    table.price,
                    table.capacity,
                    table.location,
                    holder
                )
            })
            .collect()
    }

    fn login(&mut self, args: &str) -> Vec<String> {
        let (username, password) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
        if self.admin.login(username, password.trim()) {
            vec![format!("欢迎, {}", username)]
        } else {
            vec![self.admin.login_error().unwrap_or_default().to_string()]
        }
    }

    fn list(&mut self, filter: &str) -> Result<Vec<String>> {
        self.require_admin()?;
        self.admin.set_filter(filter);
        Ok(self
            .admin
            .bookings()
            .iter()
            .map(|b| {
                format!(
                    "{} {} {} [{}] {} {} {}{}",
                    b.id,
                    b.table_id,
                    b.status.label(),
                    b.attendees.join(", "),
                    b.contact_info,
                    b.table_location,
                    b.booking_date,
                    b.notes.as_deref().map(|n| format!(" ({})", n)).unwrap_or_default()
                )
            })
            .collect())
    }

    fn stats(&self) -> Result<Vec<String>> {
        self.require_admin()?;
        let stats = self.admin.stats();
        Ok(vec![
            format!("已确认: {}  待确认: {}", stats.confirmed, stats.pending),
            format!(
                "桌位: {} 总计, {} 空闲, {} 已预订",
                stats.total_tables, stats.available_tables, stats.booked_tables
            ),
            format!("预计收入: RM {:.0}", stats.revenue),
        ])
    }

    fn add(&mut self, args: &str) -> Result<Vec<String>> {
        let mut fields = args.splitn(4, '|').map(str::trim);
        let head = fields.next().unwrap_or_default();
        let (table_id, status) = match head.split_once(char::is_whitespace) {
            Some((table_id, status)) => (table_id, parse_status(status.trim())?),
            None => (head, BookingStatus::Confirmed),
        };
        let contact = fields.next().unwrap_or_default();
        let attendees = parse_attendees(fields.next().unwrap_or_default());
        let notes = fields.next().filter(|n| !n.is_empty());

        let mut draft = BookingDraft::new(attendees, contact, table_id).with_status(status);
        if let Some(notes) = notes {
            draft = draft.with_notes(notes);
        }
        let booking = self.admin.add_booking(draft)?;
        Ok(vec![format!("已添加预订 {} ({})", booking.id, booking.table_id)])
    }

    fn editable(&self, booking_id: &str) -> Result<BookingEdit> {
        self.admin
            .snapshot()
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .map(BookingEdit::from)
            .ok_or_else(|| Error::NotFound(format!("booking {}", booking_id)))
    }

    fn set_status(&mut self, args: &str) -> Result<Vec<String>> {
        let (booking_id, status) = split_pair(args)?;
        let status = parse_status(status)?;

        let mut edit = self.editable(booking_id)?;
        edit.status = status;
        let booking = self.admin.edit_booking(booking_id, edit)?;
        Ok(vec![format!("{} → {}", booking.id, booking.status.label())])
    }

    fn move_booking(&mut self, args: &str) -> Result<Vec<String>> {
        let (booking_id, table_id) = split_pair(args)?;
        let mut edit = self.editable(booking_id)?;
        edit.table_id = table_id.to_string();
        let booking = self.admin.edit_booking(booking_id, edit)?;
        Ok(vec![format!("{} → {} ({})", booking.id, booking.table_id, booking.table_location)])
    }

    /// Replace one detail field, keeping the rest of the booking
    fn edit_details(&mut self, field: &str, args: &str) -> Result<Vec<String>> {
        let (booking_id, value) = args
            .split_once(char::is_whitespace)
            .map(|(id, value)| (id, value.trim()))
            .unwrap_or((args, ""));
        let mut edit = self.editable(booking_id)?;

        match field {
            "names" => edit.attendees = parse_attendees(value),
            "contact" => edit.contact_info = value.to_string(),
            "notes" => edit.notes = Some(value.to_string()).filter(|n| !n.is_empty()),
            _ => {
                edit.booking_date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_| Error::Validation(format!("invalid date {}", value)))?;
            }
        }

        let booking = self.admin.edit_booking(booking_id, edit)?;
        Ok(vec![format!(
            "{} [{}] {} {}{}",
            booking.id,
            booking.attendees.join(", "),
            booking.contact_info,
            booking.booking_date,
            booking.notes.as_deref().map(|n| format!(" ({})", n)).unwrap_or_default()
        )])
    }

    fn confirm(&mut self) -> Result<Vec<String>> {
        Ok(match self.admin.confirm_pending()? {
            PendingAction::Reset => vec![RESET_DONE_MESSAGE.to_string()],
            PendingAction::DeleteBooking { booking_id, .. } => vec![format!("已删除 {}", booking_id)],
        })
    }

    fn edit_seat(&mut self, field: &str, args: &str) -> Result<Vec<String>> {
        let (table_id, value) = split_pair(args)?;
        let mut table: Table = self
            .admin
            .snapshot()
            .seats
            .get(table_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("table {}", table_id)))?;

        match field {
            "price" => {
                table.price = value
                    .parse()
                    .map_err(|_| Error::Validation(format!("invalid price {}", value)))?;
            }
            "capacity" => {
                table.capacity = value
                    .parse()
                    .map_err(|_| Error::Validation(format!("invalid capacity {}", value)))?;
            }
            "location" => table.location = value.to_string(),
            _ => {
                let sponsor = Some(value.to_string()).filter(|s| !s.is_empty());
                table.tier = match table.tier {
                    TableTier::Vvip { .. } => TableTier::Vvip { sponsor },
                    TableTier::Vip { .. } => TableTier::Vip { sponsor },
                    TableTier::Regular => {
                        return Err(Error::InvalidOperation(
                            "regular tables have no sponsor".to_string(),
                        ))
                    }
                };
            }
        }

        let table = self.admin.edit_seat(table_id, table)?;
        Ok(vec![format!(
            "{}: {} / {}人 / {}",
            table.id, table.price, table.capacity, table.location
        )])
    }

    fn require_admin(&self) -> Result<()> {
        if self.admin.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Authentication(LOGIN_REQUIRED_MESSAGE.to_string()))
        }
    }
}

fn parse_status(value: &str) -> Result<BookingStatus> {
    BookingStatus::from_str(value).ok_or_else(|| Error::Validation(format!("unknown status {}", value)))
}

fn split_pair(args: &str) -> Result<(&str, &str)> {
    args.split_once(char::is_whitespace)
        .map(|(a, b)| (a, b.trim()))
        .ok_or_else(|| Error::Validation("expected two arguments".to_string()))
}

fn describe_location(found: &SeatLocation) -> Vec<String> {
    vec![
        format!("{} 的座位在 {}", found.party.join(", "), found.table_id),
        format!("位置: {}", found.location),
    ]
}

fn error_line(e: &Error) -> String {
    match e {
        Error::Validation(msg)
        | Error::TableUnavailable(msg)
        | Error::NotFound(msg)
        | Error::InvalidOperation(msg)
        | Error::Authentication(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(state: &AppState) -> Result<()> {
    let (suggestion_tx, mut suggestion_rx) = mpsc::unbounded_channel();
    let mut console = Console::new(state, suggestion_tx);
    let mut changes = state.service.lock().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                console.poll();
                match console.handle(&line) {
                    Flow::Quit => break,
                    Flow::Continue(reply) => {
                        for out in reply {
                            println!("{}", out);
                        }
                    }
                }
            }
            Some(suggestions) = suggestion_rx.recv() => {
                if suggestions.is_empty() {
                    println!("{}", NO_MATCH_MESSAGE);
                } else {
                    println!("建议: {}", suggestions.join(" / "));
                }
            }
            _ = changes.recv() => console.poll(),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use banquet_core::{AppConfig, Booking, MemoryStorage};

    fn console() -> (Console, mpsc::UnboundedReceiver<Vec<String>>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.export.dir = Some(dir.path().to_path_buf());
        let state = AppState::with_storage(Box::new(MemoryStorage::new()), config).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (Console::new(&state, tx), rx, dir)
    }

    fn reply(flow: Flow) -> Vec<String> {
        match flow {
            Flow::Continue(lines) => lines,
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_find_then_pick() {
        let (mut console, mut rx, _dir) = console();

        assert!(reply(console.handle("find 李")).is_empty());
        let suggestions = rx.recv().await.unwrap();
        assert!(suggestions.contains(&"李娜".to_string()));
        assert!(suggestions.contains(&"李丽".to_string()));

        let lines = reply(console.handle("pick 李丽"));
        assert!(lines[0].ends_with("的座位在 VVIP"));
        assert_eq!(lines[1], "位置: 舞台前方中央");

        let seats = reply(console.handle("seats"));
        assert_eq!(seats.len(), 59);
        assert!(seats[0].starts_with("*VVIP"));
    }

    #[tokio::test]
    async fn test_admin_commands_need_login() {
        let (mut console, _rx, _dir) = console();

        assert_eq!(reply(console.handle("list")), vec!["请先登录".to_string()]);
        assert_eq!(
            reply(console.handle("login admin nope")),
            vec!["用户名或密码错误".to_string()]
        );
        assert_eq!(reply(console.handle("login admin password")), vec!["欢迎, admin".to_string()]);
        assert_eq!(reply(console.handle("list")).len(), 3);
    }

    #[tokio::test]
    async fn test_booking_lifecycle() {
        let (mut console, _rx, dir) = console();
        reply(console.handle("login admin password"));

        let added = reply(console.handle("add T30 | +60 12-300-4000 | 李雷，韩梅梅 | 靠窗"));
        assert!(added[0].starts_with("已添加预订 b"));
        let id = console.admin.snapshot().bookings[3].id.clone();
        assert_eq!(console.admin.snapshot().bookings[3].attendees, vec!["李雷", "韩梅梅"]);
        assert_eq!(console.admin.snapshot().bookings[3].notes.as_deref(), Some("靠窗"));
        assert_eq!(console.admin.snapshot().bookings[3].contact_info, "+60 12-300-4000");
        assert_eq!(console.admin.snapshot().bookings[3].status, BookingStatus::Confirmed);

        assert_eq!(
            reply(console.handle("add T30 | +60 | 某人")),
            vec!["T30 已被预订 (".to_string() + &id + ")"]
        );

        reply(console.handle(&format!("move {} T31", id)));
        assert!(console.admin.snapshot().seats.is_available("T30"));
        reply(console.handle(&format!("status {} cancelled", id)));
        assert!(console.admin.snapshot().seats.is_available("T31"));

        assert_eq!(reply(console.handle(&format!("delete {}", id)))[1], "(yes / no)");
        assert_eq!(reply(console.handle("yes")), vec![format!("已删除 {}", id)]);
        assert_eq!(console.admin.snapshot().bookings.len(), 3);

        let exported = reply(console.handle("export"));
        assert!(exported[0].contains(&dir.path().display().to_string()));
    }

    #[tokio::test]
    async fn test_add_with_status_and_spaced_names() {
        let (mut console, _rx, _dir) = console();
        reply(console.handle("login admin password"));

        let added = reply(console.handle("add T40 pending | +60 11-222-3333 | Alice Tan, Bob Lim"));
        assert!(added[0].starts_with("已添加预订 b"));
        let booking = console.admin.snapshot().bookings[3].clone();
        assert_eq!(booking.table_id.as_str(), "T40");
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.attendees, vec!["Alice Tan", "Bob Lim"]);
        assert_eq!(booking.notes, None);
        assert!(!console.admin.snapshot().seats.is_available("T40"));

        assert_eq!(
            reply(console.handle("add T41 maybe | +60 | 某人")),
            vec!["unknown status maybe".to_string()]
        );
        assert_eq!(
            reply(console.handle("add T41 | +60")),
            vec!["请填写预订人姓名".to_string()]
        );
        assert_eq!(console.admin.snapshot().bookings.len(), 4);
    }

    fn b2(console: &Console) -> Booking {
        console
            .admin
            .snapshot()
            .bookings
            .iter()
            .find(|b| b.id == "b2")
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_detail_edits() {
        let (mut console, _rx, _dir) = console();
        reply(console.handle("login admin password"));
        let table_before = b2(&console).table_id;

        reply(console.handle("names b2 Mei Ling Wong，陈小春"));
        assert_eq!(b2(&console).attendees, vec!["Mei Ling Wong", "陈小春"]);

        reply(console.handle("contact b2 +60 19-876-5432"));
        assert_eq!(b2(&console).contact_info, "+60 19-876-5432");

        reply(console.handle("notes b2 需要儿童座椅"));
        assert_eq!(b2(&console).notes.as_deref(), Some("需要儿童座椅"));
        reply(console.handle("notes b2"));
        assert_eq!(b2(&console).notes, None);

        reply(console.handle("date b2 2024-12-31"));
        assert_eq!(
            b2(&console).booking_date,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert_eq!(
            reply(console.handle("date b2 tomorrow")),
            vec!["invalid date tomorrow".to_string()]
        );

        assert_eq!(
            reply(console.handle("names b2 ， ")),
            vec!["请填写预订人姓名".to_string()]
        );
        assert_eq!(
            reply(console.handle("contact nobody +60")),
            vec!["booking nobody".to_string()]
        );

        let kept = b2(&console);
        assert_eq!(kept.table_id, table_before);
        assert_eq!(kept.attendees, vec!["Mei Ling Wong", "陈小春"]);
    }

    #[tokio::test]
    async fn test_seat_edits() {
        let (mut console, _rx, _dir) = console();
        reply(console.handle("login admin password"));

        reply(console.handle("price T9 3000"));
        reply(console.handle("location T9 舞台左侧"));
        let t9 = console.admin.snapshot().seats.get("T9").unwrap().clone();
        assert_eq!(t9.price, 3000.0);
        assert_eq!(t9.location, "舞台左侧");

        assert_eq!(
            reply(console.handle("sponsor T9 某公司")),
            vec!["regular tables have no sponsor".to_string()]
        );
        reply(console.handle("sponsor VVIP 金龙集团"));
        assert_eq!(
            console.admin.snapshot().seats.get("VVIP").unwrap().sponsor(),
            Some("金龙集团")
        );
        assert_eq!(
            reply(console.handle("capacity T9 0")),
            vec!["capacity must be at least 1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_reset_and_quit() {
        let (mut console, _rx, _dir) = console();
        reply(console.handle("login admin password"));
        reply(console.handle("add T30 | +60 | 甲"));

        reply(console.handle("reset"));
        reply(console.handle("no"));
        assert_eq!(console.admin.snapshot().bookings.len(), 4);

        reply(console.handle("reset"));
        assert_eq!(reply(console.handle("yes")), vec![RESET_DONE_MESSAGE.to_string()]);
        assert_eq!(console.admin.snapshot().bookings.len(), 3);

        assert_eq!(console.handle("quit"), Flow::Quit);
    }
}
