// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::warn;
use vitrin_app::cascade::{category_label, subcategories_for, subcategory_label};
use vitrin_app::{
    AdminConsole, AdminView, CategoryId, ConsoleCommand, ConsoleEvent, EntityId, FilterCommand,
    FormKind, FormPayload, ImageUpload, LoadResult, LoadTicket, MutationTicket, Popup,
    SubcategoryId, parse_price_bound,
};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Performs the remote side of console tickets. The default `spawn_*`
/// methods run inline; runtimes that own a thread-safe backend override them
/// to keep the UI responsive.
pub trait AdminRuntime {
    fn load(&mut self, ticket: &LoadTicket) -> Result<LoadResult>;
    fn mutate(&mut self, ticket: &MutationTicket) -> Result<()>;
    fn read_image(&mut self, path: &str) -> Result<ImageUpload> {
        read_image_file(Path::new(path))
    }
    fn spawn_load(&mut self, ticket: LoadTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.load(&ticket).map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::Loaded { ticket, result })
            .map_err(|_| anyhow!("load event channel closed"))
    }
    fn spawn_mutation(&mut self, ticket: MutationTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.mutate(&ticket).map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::Mutated { ticket, result })
            .map_err(|_| anyhow!("mutation event channel closed"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Loaded {
        ticket: LoadTicket,
        result: Result<LoadResult, String>,
    },
    Mutated {
        ticket: MutationTicket,
        result: Result<(), String>,
    },
}

/// Reads a local image for upload; the MIME type follows the extension.
pub fn read_image_file(path: &Path) -> Result<ImageUpload> {
    let data = std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("image path {} has no file name", path.display()))?;
    Ok(ImageUpload::new(file_name, data))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterField {
    Search,
    MinPrice,
    MaxPrice,
}

impl FilterField {
    const fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::MinPrice => "min price",
            Self::MaxPrice => "max price",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterInput {
    field: FilterField,
    buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    NameAz,
    NameEn,
    NameRu,
    DescriptionAz,
    DescriptionEn,
    DescriptionRu,
    Category,
    Subcategory,
    Price,
    Sizes,
    Status,
    InStock,
    ImagePath,
}

impl FormField {
    const fn label(self) -> &'static str {
        match self {
            Self::NameAz => "name (az)",
            Self::NameEn => "name (en)",
            Self::NameRu => "name (ru)",
            Self::DescriptionAz => "description (az)",
            Self::DescriptionEn => "description (en)",
            Self::DescriptionRu => "description (ru)",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::Price => "price",
            Self::Sizes => "sizes",
            Self::Status => "status",
            Self::InStock => "in stock",
            Self::ImagePath => "new image file",
        }
    }

    const fn is_text(self) -> bool {
        !matches!(
            self,
            Self::Category | Self::Subcategory | Self::Status | Self::InStock
        )
    }
}

const CATEGORY_FIELDS: [FormField; 4] = [
    FormField::NameAz,
    FormField::NameEn,
    FormField::NameRu,
    FormField::ImagePath,
];

const SUBCATEGORY_FIELDS: [FormField; 4] = [
    FormField::NameAz,
    FormField::NameEn,
    FormField::NameRu,
    FormField::Category,
];

const PRODUCT_FIELDS: [FormField; 13] = [
    FormField::NameAz,
    FormField::NameEn,
    FormField::NameRu,
    FormField::DescriptionAz,
    FormField::DescriptionEn,
    FormField::DescriptionRu,
    FormField::Category,
    FormField::Subcategory,
    FormField::Price,
    FormField::Sizes,
    FormField::Status,
    FormField::InStock,
    FormField::ImagePath,
];

fn form_fields(kind: FormKind) -> &'static [FormField] {
    match kind {
        FormKind::Category => &CATEGORY_FIELDS,
        FormKind::Subcategory => &SUBCATEGORY_FIELDS,
        FormKind::Product => &PRODUCT_FIELDS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor: usize,
    form_field: usize,
    filter_input: Option<FilterInput>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AdminRuntime>(console: &mut AdminConsole, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let events = console.open();
    handle_console_events(console, runtime, &mut view_data, &internal_tx, events);

    let mut result = Ok(());
    loop {
        process_internal_events(console, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, console, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(console, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                console.dispatch(ConsoleCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Loaded { ticket, result } => {
                let events = console.apply_load(&ticket, result.map_err(anyhow::Error::msg));
                handle_console_events(console, runtime, view_data, tx, events);
                clamp_cursor(console, view_data);
            }
            InternalEvent::Mutated { ticket, result } => {
                let events = console.apply_mutation(&ticket, result.map_err(anyhow::Error::msg));
                handle_console_events(console, runtime, view_data, tx, events);
            }
        }
    }
}

/// Starts the loads a transition asked for and resets UI state that belongs
/// to the previous view or popup.
fn handle_console_events<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    events: Vec<ConsoleEvent>,
) {
    for event in events {
        match event {
            ConsoleEvent::LoadRequested(ticket) => {
                if let Err(error) = runtime.spawn_load(ticket, tx.clone()) {
                    warn!(
                        load = ticket.target.label(),
                        error = %format!("{error:#}"),
                        "load not started"
                    );
                    emit_status(console, view_data, tx, format!("load failed: {error:#}"));
                }
            }
            ConsoleEvent::ViewChanged(_) | ConsoleEvent::FiltersChanged(_) => {
                view_data.cursor = 0;
            }
            ConsoleEvent::PopupChanged(_) => {
                view_data.form_field = 0;
            }
            ConsoleEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(tx, view_data.status_token);
            }
            ConsoleEvent::StatusCleared => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    console: &mut AdminConsole,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    console.dispatch(ConsoleCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: ConsoleCommand,
) {
    let events = console.dispatch(command);
    handle_console_events(console, runtime, view_data, tx, events);
}

fn handle_key_event<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.filter_input.is_some() {
        handle_filter_input_key(console, runtime, view_data, internal_tx, key);
        return false;
    }

    let popup = console.popup();
    if popup.is_form() {
        handle_form_key(console, runtime, view_data, internal_tx, key);
        return false;
    }
    if popup.is_confirmation() {
        handle_confirm_key(console, runtime, view_data, internal_tx, key);
        return false;
    }

    handle_nav_key(console, runtime, view_data, internal_tx, key)
}

fn handle_nav_key<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Tab | KeyCode::Char('f') => {
            dispatch(console, runtime, view_data, tx, ConsoleCommand::NextView);
        }
        KeyCode::BackTab | KeyCode::Char('b') => {
            dispatch(console, runtime, view_data, tx, ConsoleCommand::PrevView);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.cursor = view_data.cursor.saturating_add(1);
            clamp_cursor(console, view_data);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.cursor = view_data.cursor.saturating_sub(1);
        }
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
            dispatch(console, runtime, view_data, tx, ConsoleCommand::NextPage);
        }
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
            dispatch(console, runtime, view_data, tx, ConsoleCommand::PrevPage);
        }
        KeyCode::Char('/') => {
            view_data.filter_input = Some(FilterInput {
                field: FilterField::Search,
                buffer: console.filters.search.clone(),
            });
        }
        KeyCode::Char('[') | KeyCode::Char(']') => {
            if console.view != AdminView::Products {
                emit_status(console, view_data, tx, "price filter applies to products");
                return false;
            }
            let (field, current) = if key.code == KeyCode::Char('[') {
                (FilterField::MinPrice, console.filters.min_price)
            } else {
                (FilterField::MaxPrice, console.filters.max_price)
            };
            view_data.filter_input = Some(FilterInput {
                field,
                buffer: current.map(|price| price.to_string()).unwrap_or_default(),
            });
        }
        KeyCode::Char(code @ ('c' | 'C')) => {
            if console.view == AdminView::Categories {
                emit_status(console, view_data, tx, "no category filter in this view");
                return false;
            }
            let delta = if code == 'c' { 1 } else { -1 };
            let options: Vec<CategoryId> = console
                .store
                .categories
                .iter()
                .map(|category| category.id)
                .collect();
            let next = cycle_option(console.filters.category_id, &options, delta);
            let command = ConsoleCommand::Filter(FilterCommand::SelectCategory(next));
            dispatch(console, runtime, view_data, tx, command);
        }
        KeyCode::Char(code @ ('s' | 'S')) => {
            if console.view != AdminView::Products {
                emit_status(console, view_data, tx, "subcategory filter applies to products");
                return false;
            }
            let options: Vec<SubcategoryId> =
                subcategories_for(console.filters.category_id, &console.store.subcategories)
                    .iter()
                    .map(|sub| sub.id)
                    .collect();
            if options.is_empty() {
                emit_status(console, view_data, tx, "choose a category first");
                return false;
            }
            let delta = if code == 's' { 1 } else { -1 };
            let next = cycle_option(console.filters.subcategory_id, &options, delta);
            let command = ConsoleCommand::Filter(FilterCommand::SelectSubcategory(next));
            dispatch(console, runtime, view_data, tx, command);
        }
        KeyCode::Char('x') => {
            let command = ConsoleCommand::Filter(FilterCommand::Reset);
            dispatch(console, runtime, view_data, tx, command);
        }
        KeyCode::Char('r') => dispatch(console, runtime, view_data, tx, ConsoleCommand::Refresh),
        KeyCode::Char('a') => dispatch(console, runtime, view_data, tx, ConsoleCommand::OpenCreate),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(id) = selected_entity(console, view_data.cursor) {
                dispatch(console, runtime, view_data, tx, ConsoleCommand::OpenEdit(id));
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = selected_entity(console, view_data.cursor) {
                dispatch(console, runtime, view_data, tx, ConsoleCommand::OpenDelete(id));
            }
        }
        KeyCode::Char('t') => {
            if let Some(EntityId::Product(id)) = selected_entity(console, view_data.cursor) {
                dispatch(console, runtime, view_data, tx, ConsoleCommand::OpenToggle(id));
            }
        }
        _ => {}
    }
    false
}

fn handle_filter_input_key<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(mut input) = view_data.filter_input.take() else {
        return;
    };
    match key.code {
        KeyCode::Esc => return,
        KeyCode::Enter => {
            let command = match input.field {
                FilterField::Search => FilterCommand::SetSearch(input.buffer),
                FilterField::MinPrice | FilterField::MaxPrice => {
                    match parse_price_bound(&input.buffer) {
                        Ok(bound) if input.field == FilterField::MinPrice => {
                            FilterCommand::SetMinPrice(bound)
                        }
                        Ok(bound) => FilterCommand::SetMaxPrice(bound),
                        Err(error) => {
                            emit_status(console, view_data, tx, format!("{error:#}"));
                            view_data.filter_input = Some(input);
                            return;
                        }
                    }
                }
            };
            dispatch(console, runtime, view_data, tx, ConsoleCommand::Filter(command));
            return;
        }
        KeyCode::Backspace => {
            input.buffer.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.buffer.push(ch);
        }
        _ => {}
    }
    if input.field == FilterField::Search {
        let command = ConsoleCommand::Filter(FilterCommand::SetSearch(input.buffer.clone()));
        dispatch(console, runtime, view_data, tx, command);
    }
    view_data.filter_input = Some(input);
}

fn handle_form_key<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(kind) = console.form().map(FormPayload::kind) else {
        return;
    };
    let fields = form_fields(kind);
    let field = fields[view_data.form_field.min(fields.len().saturating_sub(1))];

    match key.code {
        KeyCode::Esc => dispatch(console, runtime, view_data, tx, ConsoleCommand::ClosePopup),
        KeyCode::Enter => submit_form(console, runtime, view_data, tx),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            submit_form(console, runtime, view_data, tx);
        }
        KeyCode::Tab | KeyCode::Down => {
            view_data.form_field = (view_data.form_field + 1) % fields.len();
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_data.form_field = (view_data.form_field + fields.len() - 1) % fields.len();
        }
        KeyCode::Left if !field.is_text() => {
            if let Some(message) = cycle_form_choice(console, field, -1) {
                emit_status(console, view_data, tx, message);
            }
        }
        KeyCode::Right if !field.is_text() => {
            if let Some(message) = cycle_form_choice(console, field, 1) {
                emit_status(console, view_data, tx, message);
            }
        }
        KeyCode::Char(' ') if !field.is_text() => {
            if let Some(message) = cycle_form_choice(console, field, 1) {
                emit_status(console, view_data, tx, message);
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = console.form_mut().and_then(|form| text_field_mut(form, field)) {
                text.pop();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(text) = console.form_mut().and_then(|form| text_field_mut(form, field)) {
                text.push(ch);
            }
        }
        _ => {}
    }
}

fn handle_confirm_key<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => match console.begin_confirm() {
            Ok(ticket) => start_mutation(console, runtime, view_data, tx, ticket),
            Err(error) => {
                let event = console.report(&error);
                handle_console_events(console, runtime, view_data, tx, vec![event]);
            }
        },
        KeyCode::Char('n') | KeyCode::Esc => {
            dispatch(console, runtime, view_data, tx, ConsoleCommand::ClosePopup);
        }
        _ => {}
    }
}

fn submit_form<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let image_path = console
        .form()
        .and_then(FormPayload::image_path)
        .map(str::to_owned);
    let image = match image_path {
        Some(path) => match runtime.read_image(&path) {
            Ok(image) => Some(image),
            Err(error) => {
                emit_status(console, view_data, tx, format!("{error:#}"));
                return;
            }
        },
        None => None,
    };
    match console.begin_submit(image) {
        Ok(ticket) => start_mutation(console, runtime, view_data, tx, ticket),
        Err(error) => {
            let event = console.report(&error);
            handle_console_events(console, runtime, view_data, tx, vec![event]);
        }
    }
}

fn start_mutation<R: AdminRuntime>(
    console: &mut AdminConsole,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    ticket: MutationTicket,
) {
    if let Err(error) = runtime.spawn_mutation(ticket.clone(), tx.clone()) {
        let events = console.apply_mutation(&ticket, Err(error));
        handle_console_events(console, runtime, view_data, tx, events);
    }
}

/// Steps through `None` followed by each option, wrapping at both ends.
fn cycle_option<T: Copy + PartialEq>(current: Option<T>, options: &[T], delta: isize) -> Option<T> {
    let len = options.len() as isize + 1;
    let index = current
        .and_then(|value| options.iter().position(|option| *option == value))
        .map_or(0, |position| position as isize + 1);
    let next = (index + delta).rem_euclid(len);
    if next == 0 {
        None
    } else {
        options.get(next as usize - 1).copied()
    }
}

fn cycle_form_choice(console: &mut AdminConsole, field: FormField, delta: isize) -> Option<String> {
    match field {
        FormField::Category => {
            let current = match console.form()? {
                FormPayload::Product(product) => product.category_id,
                FormPayload::Subcategory(subcategory) => subcategory.category_id,
                FormPayload::Category(_) => return None,
            };
            let options: Vec<CategoryId> = console
                .store
                .categories
                .iter()
                .map(|category| category.id)
                .collect();
            if options.is_empty() {
                return Some("no categories loaded -- press r to reload".to_owned());
            }
            console.set_form_category(cycle_option(current, &options, delta));
            None
        }
        FormField::Subcategory => {
            let FormPayload::Product(product) = console.form()? else {
                return None;
            };
            let options: Vec<SubcategoryId> = product
                .subcategory_options(&console.store.subcategories)
                .iter()
                .map(|sub| sub.id)
                .collect();
            if options.is_empty() {
                return Some("choose a category first".to_owned());
            }
            let next = cycle_option(product.subcategory_id, &options, delta);
            if let Some(FormPayload::Product(product)) = console.form_mut() {
                product.subcategory_id = next;
            }
            None
        }
        FormField::Status => {
            if let Some(FormPayload::Product(product)) = console.form_mut() {
                product.status = !product.status;
            }
            None
        }
        FormField::InStock => {
            if let Some(FormPayload::Product(product)) = console.form_mut() {
                product.in_stock = !product.in_stock;
            }
            None
        }
        _ => None,
    }
}

fn text_field_mut(form: &mut FormPayload, field: FormField) -> Option<&mut String> {
    match form {
        FormPayload::Category(input) => match field {
            FormField::NameAz => Some(&mut input.name_az),
            FormField::NameEn => Some(&mut input.name_en),
            FormField::NameRu => Some(&mut input.name_ru),
            FormField::ImagePath => Some(&mut input.image_path),
            _ => None,
        },
        FormPayload::Subcategory(input) => match field {
            FormField::NameAz => Some(&mut input.name_az),
            FormField::NameEn => Some(&mut input.name_en),
            FormField::NameRu => Some(&mut input.name_ru),
            _ => None,
        },
        FormPayload::Product(input) => match field {
            FormField::NameAz => Some(&mut input.name_az),
            FormField::NameEn => Some(&mut input.name_en),
            FormField::NameRu => Some(&mut input.name_ru),
            FormField::DescriptionAz => Some(&mut input.description_az),
            FormField::DescriptionEn => Some(&mut input.description_en),
            FormField::DescriptionRu => Some(&mut input.description_ru),
            FormField::Price => Some(&mut input.price),
            FormField::Sizes => Some(&mut input.sizes),
            FormField::ImagePath => Some(&mut input.image_path),
            _ => None,
        },
    }
}

fn form_field_value(console: &AdminConsole, form: &FormPayload, field: FormField) -> String {
    let store = &console.store;
    let category = |id: Option<CategoryId>| {
        id.map_or_else(|| "(none)".to_owned(), |id| category_label(id, &store.categories))
    };
    match form {
        FormPayload::Category(input) => match field {
            FormField::NameAz => input.name_az.clone(),
            FormField::NameEn => input.name_en.clone(),
            FormField::NameRu => input.name_ru.clone(),
            FormField::ImagePath => image_field_value(&input.image_path, &input.images),
            _ => String::new(),
        },
        FormPayload::Subcategory(input) => match field {
            FormField::NameAz => input.name_az.clone(),
            FormField::NameEn => input.name_en.clone(),
            FormField::NameRu => input.name_ru.clone(),
            FormField::Category => category(input.category_id),
            _ => String::new(),
        },
        FormPayload::Product(input) => match field {
            FormField::NameAz => input.name_az.clone(),
            FormField::NameEn => input.name_en.clone(),
            FormField::NameRu => input.name_ru.clone(),
            FormField::DescriptionAz => input.description_az.clone(),
            FormField::DescriptionEn => input.description_en.clone(),
            FormField::DescriptionRu => input.description_ru.clone(),
            FormField::Category => category(input.category_id),
            FormField::Subcategory => input.subcategory_id.map_or_else(
                || "(none)".to_owned(),
                |id| subcategory_label(id, &store.subcategories),
            ),
            FormField::Price => input.price.clone(),
            FormField::Sizes => input.sizes.clone(),
            FormField::Status => active_label(input.status).to_owned(),
            FormField::InStock => yes_no(input.in_stock).to_owned(),
            FormField::ImagePath => image_field_value(&input.image_path, &input.images),
        },
    }
}

fn image_field_value(path: &str, current: &[String]) -> String {
    if !path.is_empty() {
        return path.to_owned();
    }
    match current.first() {
        Some(url) => format!("(keep {url})"),
        None => "(none)".to_owned(),
    }
}

const fn active_label(status: bool) -> &'static str {
    if status { "active" } else { "inactive" }
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn visible_row_count(console: &AdminConsole) -> usize {
    match console.view {
        AdminView::Products => console.visible_products().len(),
        AdminView::Categories => console.visible_categories().len(),
        AdminView::Subcategories => console.visible_subcategories().len(),
    }
}

fn clamp_cursor(console: &AdminConsole, view_data: &mut ViewData) {
    let count = visible_row_count(console);
    view_data.cursor = view_data.cursor.min(count.saturating_sub(1));
}

fn selected_entity(console: &AdminConsole, cursor: usize) -> Option<EntityId> {
    match console.view {
        AdminView::Products => console
            .visible_products()
            .get(cursor)
            .map(|product| EntityId::Product(product.id)),
        AdminView::Categories => console
            .visible_categories()
            .get(cursor)
            .map(|category| EntityId::Category(category.id)),
        AdminView::Subcategories => console
            .visible_subcategories()
            .get(cursor)
            .map(|sub| EntityId::Subcategory(sub.id)),
    }
}

fn entity_name(console: &AdminConsole, id: EntityId) -> Option<&str> {
    match id {
        EntityId::Category(id) => console.store.category(id).map(|c| c.name_az.as_str()),
        EntityId::Subcategory(id) => console.store.subcategory(id).map(|s| s.name_az.as_str()),
        EntityId::Product(id) => console.store.product(id).map(|p| p.name_az.as_str()),
    }
}

const fn table_headers(view: AdminView) -> &'static [&'static str] {
    match view {
        AdminView::Products => &[
            "id",
            "name",
            "category",
            "subcategory",
            "price",
            "sizes",
            "status",
            "stock",
        ],
        AdminView::Categories => &["id", "name (az)", "name (en)", "name (ru)", "images"],
        AdminView::Subcategories => &["id", "name (az)", "name (en)", "name (ru)", "category"],
    }
}

fn column_widths(view: AdminView) -> Vec<Constraint> {
    match view {
        AdminView::Products => vec![
            Constraint::Length(6),
            Constraint::Min(18),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(6),
        ],
        AdminView::Categories => vec![
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Min(16),
            Constraint::Min(16),
            Constraint::Length(7),
        ],
        AdminView::Subcategories => vec![
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Min(16),
            Constraint::Min(16),
            Constraint::Length(18),
        ],
    }
}

fn table_rows(console: &AdminConsole) -> Vec<Vec<String>> {
    let store = &console.store;
    match console.view {
        AdminView::Products => console
            .visible_products()
            .into_iter()
            .map(|product| {
                vec![
                    product.id.to_string(),
                    product.name_az.clone(),
                    category_label(product.category_id, &store.categories),
                    subcategory_label(product.subcategory_id, &store.subcategories),
                    product.price.normalize().to_string(),
                    product.sizes.join(","),
                    active_label(product.status).to_owned(),
                    yes_no(product.in_stock).to_owned(),
                ]
            })
            .collect(),
        AdminView::Categories => console
            .visible_categories()
            .into_iter()
            .map(|category| {
                vec![
                    category.id.to_string(),
                    category.name_az.clone(),
                    category.name_en.clone(),
                    category.name_ru.clone(),
                    category.img.len().to_string(),
                ]
            })
            .collect(),
        AdminView::Subcategories => console
            .visible_subcategories()
            .into_iter()
            .map(|sub| {
                vec![
                    sub.id.to_string(),
                    sub.name_az.clone(),
                    sub.name_en.clone(),
                    sub.name_ru.clone(),
                    category_label(sub.category_id, &store.categories),
                ]
            })
            .collect(),
    }
}

fn filter_bar_text(console: &AdminConsole, view_data: &ViewData) -> String {
    let editing = |field: FilterField| {
        view_data
            .filter_input
            .as_ref()
            .filter(|input| input.field == field)
            .map(|input| format!("{}_", input.buffer))
    };
    let filters = &console.filters;
    let store = &console.store;
    let category = filters
        .category_id
        .map_or_else(|| "all".to_owned(), |id| category_label(id, &store.categories));
    let search = editing(FilterField::Search).unwrap_or_else(|| filters.search.clone());
    let search = format!("{}: {search:?}", FilterField::Search.label());

    match console.view {
        AdminView::Products => {
            let subcategory = filters.subcategory_id.map_or_else(
                || "all".to_owned(),
                |id| subcategory_label(id, &store.subcategories),
            );
            let min = editing(FilterField::MinPrice)
                .or_else(|| filters.min_price.map(|price| price.to_string()))
                .unwrap_or_default();
            let max = editing(FilterField::MaxPrice)
                .or_else(|| filters.max_price.map(|price| price.to_string()))
                .unwrap_or_default();
            format!(
                "category: {category} | subcategory: {subcategory} | {search} | price: {min}..{max} | page {}",
                console.pagination().label()
            )
        }
        AdminView::Categories => search,
        AdminView::Subcategories => format!("category: {category} | {search}"),
    }
}

fn status_text(console: &AdminConsole, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let popup = console.popup();
    let hints = if let Some(input) = &view_data.filter_input {
        format!("{}: enter apply | esc cancel", input.field.label())
    } else if popup.is_form() {
        "tab/↑↓ field | ←/→/space choose | enter save | esc cancel".to_owned()
    } else if popup.is_confirmation() {
        "y confirm | n cancel".to_owned()
    } else {
        "tab view | j/k move | n/p page | / search | [ ] price | c/s filter | x reset | a add | e edit | d delete | t toggle | r reload | ? help | q quit".to_owned()
    };

    let mut parts = Vec::new();
    if console.is_loading() {
        parts.push("saving...".to_owned());
    }
    if let Some(status) = &console.status_line {
        parts.push(status.clone());
    } else if let Some(summary) = console.visibility_summary() {
        parts.push(summary);
    }
    parts.push(hints);
    parts.join(" | ")
}

fn form_overlay_text(console: &AdminConsole, view_data: &ViewData) -> String {
    let Some(form) = console.form() else {
        return String::new();
    };
    let fields = form_fields(form.kind());
    let mut lines = Vec::with_capacity(fields.len() + 2);
    for (index, field) in fields.iter().enumerate() {
        let marker = if index == view_data.form_field { ">" } else { " " };
        let value = form_field_value(console, form, *field);
        lines.push(format!("{marker} {:<18} {value}", field.label()));
    }
    if let FormPayload::Product(product) = form {
        lines.push(format!("  {:<18} {}", "ingredients", product.ingredients.join(", ")));
    }
    lines.join("\n")
}

fn confirm_overlay_text(console: &AdminConsole) -> String {
    let popup = console.popup();
    let target = match popup {
        Popup::ConfirmingDelete(id) => Some(id),
        Popup::ConfirmingToggle { id, .. } => Some(EntityId::Product(id)),
        _ => None,
    };
    let name = target
        .and_then(|id| entity_name(console, id))
        .map(|name| format!("\n{name}"))
        .unwrap_or_default();
    format!("{}{name}\n\ny confirm | n cancel", popup.title())
}

fn help_overlay_text() -> String {
    [
        "tab / shift+tab   next / previous view",
        "j k               move selection",
        "n p               next / previous page (products)",
        "/                 search names in all locales",
        "[ ]               minimum / maximum price (products)",
        "c C               cycle category filter",
        "s S               cycle subcategory filter (products)",
        "x                 reset filters",
        "r                 reload the current view",
        "a                 add",
        "e enter           edit selected row",
        "d                 delete selected row",
        "t                 activate / deactivate product",
        "q ctrl+q          quit",
        "",
        "search and price narrow the current page only",
    ]
    .join("\n")
}

fn render(frame: &mut ratatui::Frame<'_>, console: &AdminConsole, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = AdminView::ALL
        .iter()
        .position(|view| *view == console.view)
        .unwrap_or(0);
    let tabs = Tabs::new(AdminView::ALL.iter().map(|view| view.label()).collect::<Vec<_>>())
        .block(Block::default().title("vitrin").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let filter_bar = Paragraph::new(filter_bar_text(console, view_data))
        .block(Block::default().title("filters").borders(Borders::ALL));
    frame.render_widget(filter_bar, layout[1]);

    render_table(frame, layout[2], console, view_data);

    let status_widget = Paragraph::new(status_text(console, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    let popup = console.popup();
    if popup.is_form() {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(form_overlay_text(console, view_data)).block(
            Block::default()
                .title(popup.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(form, area);
    } else if popup.is_confirmation() {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(confirm_overlay_text(console))
            .block(Block::default().title("confirm").borders(Borders::ALL));
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    console: &AdminConsole,
    view_data: &ViewData,
) {
    let header = Row::new(
        table_headers(console.view)
            .iter()
            .map(|label| Cell::from(*label)),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = table_rows(console);
    let body: Vec<Row> = if rows.is_empty() {
        vec![Row::new(vec![Cell::from(""), Cell::from(format!("no {}", console.view.label()))])]
    } else {
        rows.into_iter()
            .enumerate()
            .map(|(index, cells)| {
                let row = Row::new(cells.into_iter().map(Cell::from));
                if index == view_data.cursor {
                    row.style(Style::default().fg(Color::Black).bg(Color::Cyan))
                } else {
                    row
                }
            })
            .collect()
    };

    let table = Table::new(body, column_widths(console.view))
        .header(header)
        .block(
            Block::default()
                .title(console.view.label())
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AdminRuntime, InternalEvent, ViewData, confirm_overlay_text, cycle_option,
        filter_bar_text, form_overlay_text, handle_console_events, handle_key_event,
        process_internal_events, read_image_file, status_text, table_rows,
    };
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc::{self, Receiver, Sender};
    use vitrin_app::{
        AdminConsole, AdminView, CatalogBackend, CategoryId, FormPayload, LoadResult, LoadTicket,
        MutationTicket, Popup, ProductId, execute_load, execute_mutation,
    };
    use vitrin_testkit::{
        DEMO_IMAGE_ORIGIN, MemoryCatalog, Operation, demo_catalog, temp_image_file,
    };

    #[derive(Debug, Clone)]
    struct TestRuntime {
        catalog: MemoryCatalog,
        loads: usize,
        mutations: usize,
    }

    impl AdminRuntime for TestRuntime {
        fn load(&mut self, ticket: &LoadTicket) -> Result<LoadResult> {
            self.loads += 1;
            execute_load(&self.catalog, ticket)
        }

        fn mutate(&mut self, ticket: &MutationTicket) -> Result<()> {
            self.mutations += 1;
            execute_mutation(&self.catalog, ticket)
        }
    }

    struct Harness {
        console: AdminConsole,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(view: AdminView, catalog: MemoryCatalog) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                console: AdminConsole::new(view, DEMO_IMAGE_ORIGIN, vec!["kofe".to_owned()]),
                runtime: TestRuntime {
                    catalog,
                    loads: 0,
                    mutations: 0,
                },
                view_data: ViewData::default(),
                tx,
                rx,
            };
            let events = harness.console.open();
            handle_console_events(
                &mut harness.console,
                &mut harness.runtime,
                &mut harness.view_data,
                &harness.tx,
                events,
            );
            harness.drain();
            harness
        }

        fn drain(&mut self) {
            process_internal_events(
                &mut self.console,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                &self.rx,
            );
        }

        fn press_key(&mut self, key: KeyEvent) -> bool {
            let quit = handle_key_event(
                &mut self.console,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                key,
            );
            self.drain();
            quit
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.press_key(KeyEvent::new(code, KeyModifiers::NONE))
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }
    }

    fn demo() -> MemoryCatalog {
        demo_catalog(10).expect("demo catalog")
    }

    #[test]
    fn opening_products_loads_options_and_first_page() {
        let harness = Harness::new(AdminView::Products, demo());
        assert_eq!(harness.runtime.loads, 2);
        assert_eq!(harness.console.store.products.len(), 10);
        assert_eq!(harness.console.store.categories.len(), 4);
        assert_eq!(harness.console.pagination().total_pages, 4);
        assert_eq!(table_rows(&harness.console).len(), 10);
    }

    #[test]
    fn tab_switches_view_and_resets_cursor() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Char('j'));
        assert_eq!(harness.view_data.cursor, 2);

        harness.press(KeyCode::Tab);
        assert_eq!(harness.console.view, AdminView::Categories);
        assert_eq!(harness.view_data.cursor, 0);
        assert_eq!(table_rows(&harness.console).len(), 4);
    }

    #[test]
    fn cursor_stops_at_last_row() {
        let mut harness = Harness::new(AdminView::Categories, demo());
        for _ in 0..10 {
            harness.press(KeyCode::Down);
        }
        assert_eq!(harness.view_data.cursor, 3);
    }

    #[test]
    fn search_input_narrows_rows_live() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('/'));
        harness.type_text("KAPU");
        assert!(filter_bar_text(&harness.console, &harness.view_data).contains("KAPU_"));
        harness.press(KeyCode::Enter);

        let rows = table_rows(&harness.console);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "Kapuçino");
        assert!(
            status_text(&harness.console, &harness.view_data)
                .contains("showing 1 of 10 on this page")
        );
    }

    #[test]
    fn invalid_price_keeps_input_open() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('['));
        harness.type_text("abc");
        harness.press(KeyCode::Enter);
        assert!(harness.view_data.filter_input.is_some());
        assert_eq!(harness.console.filters.min_price, None);
        assert!(
            harness
                .console
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("invalid price"))
        );
    }

    #[test]
    fn category_cycle_refetches_first_page() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.console.filters.page, 2);

        harness.press(KeyCode::Char('c'));
        assert_eq!(harness.console.filters.category_id, Some(CategoryId::new(1)));
        assert_eq!(harness.console.filters.page, 1);
        assert!(
            harness
                .console
                .store
                .products
                .iter()
                .all(|product| product.category_id == CategoryId::new(1))
        );
    }

    #[test]
    fn subcategory_cycle_requires_category() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('s'));
        assert_eq!(harness.console.filters.subcategory_id, None);
        assert_eq!(
            harness.console.status_line.as_deref(),
            Some("choose a category first")
        );
    }

    #[test]
    fn delete_confirmation_removes_selected_row() {
        let catalog = demo();
        let mut harness = Harness::new(AdminView::Products, catalog.clone());
        let target = harness.console.store.products[0].id;

        harness.press(KeyCode::Char('d'));
        let prompt = confirm_overlay_text(&harness.console);
        assert!(prompt.contains(&format!("delete product {target}?")));
        harness.press(KeyCode::Char('y'));

        assert_eq!(harness.console.popup(), Popup::Closed);
        assert!(catalog.product(target).expect("lookup").is_none());
        assert!(harness.console.store.product(target).is_none());
    }

    #[test]
    fn declined_confirmation_sends_nothing() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('t'));
        assert!(matches!(harness.console.popup(), Popup::ConfirmingToggle { .. }));
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.console.popup(), Popup::Closed);
        assert_eq!(harness.runtime.mutations, 0);
    }

    #[test]
    fn failed_toggle_keeps_confirmation_open() {
        let catalog = demo();
        let mut harness = Harness::new(AdminView::Products, catalog.clone());
        catalog
            .fail_next(Operation::UpdateProduct, "read only")
            .expect("inject failure");

        harness.press(KeyCode::Char('t'));
        harness.press(KeyCode::Char('y'));

        assert!(matches!(harness.console.popup(), Popup::ConfirmingToggle { .. }));
        assert!(
            harness
                .console
                .status_line
                .as_deref()
                .is_some_and(|status| status.ends_with("server error (500): read only"))
        );
    }

    #[test]
    fn typed_category_form_creates_category() {
        let catalog = demo();
        let mut harness = Harness::new(AdminView::Categories, catalog.clone());
        harness.press(KeyCode::Char('a'));
        assert_eq!(harness.console.popup(), Popup::Creating);

        harness.type_text("Şorbalar");
        harness.press(KeyCode::Tab);
        harness.type_text("Soups");
        harness.press(KeyCode::Tab);
        harness.type_text("Супы");
        assert!(form_overlay_text(&harness.console, &harness.view_data).contains("> name (ru)"));
        harness.press(KeyCode::Enter);

        assert_eq!(harness.console.popup(), Popup::Closed);
        let categories = catalog.list_categories().expect("categories");
        assert!(categories.iter().any(|category| category.name_en == "Soups"));
        assert_eq!(harness.console.store.categories.len(), 5);
    }

    #[test]
    fn incomplete_form_stays_open_without_request() {
        let mut harness = Harness::new(AdminView::Categories, demo());
        harness.press(KeyCode::Char('a'));
        harness.type_text("Yalnız az");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.console.popup(), Popup::Creating);
        assert_eq!(harness.runtime.mutations, 0);
        assert_eq!(
            harness.console.status_line.as_deref(),
            Some("category name (en) is required -- enter a name and retry")
        );

        harness.press(KeyCode::Esc);
        assert_eq!(harness.console.popup(), Popup::Closed);
    }

    #[test]
    fn product_form_cycles_category_and_subcategory() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('a'));
        for _ in 0..6 {
            harness.press(KeyCode::Tab);
        }
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Right);

        let Some(FormPayload::Product(form)) = harness.console.form() else {
            panic!("product form expected");
        };
        assert_eq!(form.category_id, Some(CategoryId::new(1)));
        let subcategory = form.subcategory_id.expect("subcategory chosen");
        let sub = harness
            .console
            .store
            .subcategory(subcategory)
            .expect("known subcategory");
        assert_eq!(sub.category_id, CategoryId::new(1));
    }

    #[test]
    fn edit_with_image_uploads_and_rewrites_url() {
        let catalog = demo();
        let mut harness = Harness::new(AdminView::Categories, catalog.clone());
        let (_dir, path) = temp_image_file("menu.png", b"png").expect("temp image");

        harness.press(KeyCode::Enter);
        assert!(matches!(harness.console.popup(), Popup::Editing(_)));
        for _ in 0..3 {
            harness.press(KeyCode::Tab);
        }
        harness.type_text(&path.display().to_string());
        harness.press(KeyCode::Enter);

        assert_eq!(harness.console.popup(), Popup::Closed);
        let first = catalog
            .category(CategoryId::new(1))
            .expect("lookup")
            .expect("category");
        assert_eq!(first.img.len(), 1);
        assert!(first.img[0].starts_with(DEMO_IMAGE_ORIGIN));
        assert!(first.img[0].ends_with("menu.png"));
    }

    #[test]
    fn missing_image_file_is_reported() {
        let mut harness = Harness::new(AdminView::Categories, demo());
        harness.press(KeyCode::Enter);
        for _ in 0..3 {
            harness.press(KeyCode::Tab);
        }
        harness.type_text("/definitely/not/here.png");
        harness.press(KeyCode::Enter);

        assert!(matches!(harness.console.popup(), Popup::Editing(_)));
        assert_eq!(harness.runtime.mutations, 0);
        assert!(
            harness
                .console
                .status_line
                .as_deref()
                .is_some_and(|status| status.starts_with("read image"))
        );
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut harness = Harness::new(AdminView::Products, demo());
        harness.press(KeyCode::Char('s'));
        let token = harness.view_data.status_token;

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: token - 1 })
            .expect("send");
        harness.drain();
        assert!(harness.console.status_line.is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus { token })
            .expect("send");
        harness.drain();
        assert!(harness.console.status_line.is_none());
    }

    #[test]
    fn quit_keys() {
        let mut harness = Harness::new(AdminView::Products, demo());
        assert!(harness.press_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        harness.press(KeyCode::Char('a'));
        assert!(!harness.press(KeyCode::Char('q')));
        harness.press(KeyCode::Esc);
        assert_eq!(harness.console.popup(), Popup::Closed);
        assert!(harness.press(KeyCode::Char('q')));
    }

    #[test]
    fn cycle_option_wraps_through_none() {
        let options = [ProductId::new(1), ProductId::new(2)];
        assert_eq!(cycle_option(None, &options, 1), Some(ProductId::new(1)));
        assert_eq!(cycle_option(Some(ProductId::new(2)), &options, 1), None);
        assert_eq!(cycle_option(None, &options, -1), Some(ProductId::new(2)));
        assert_eq!(cycle_option::<ProductId>(None, &[], 1), None);
    }

    #[test]
    fn image_mime_follows_extension() {
        let (_dir, path) = temp_image_file("photo.JPG", b"jpg").expect("temp image");
        let image = read_image_file(&path).expect("readable image");
        assert_eq!(image.file_name, "photo.JPG");
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, b"jpg".to_vec());
    }

    #[test]
    fn empty_view_renders_no_rows() {
        let harness = Harness::new(AdminView::Products, MemoryCatalog::default());
        assert!(table_rows(&harness.console).is_empty());
        assert!(filter_bar_text(&harness.console, &harness.view_data).contains("page 1 / 1"));
    }
}
