//! Keyboard handling for the dashboard.
//!
//! Keys map to [`Action`]s first, then [`apply_action`] turns an action into
//! state changes and, where backend work is needed, a [`Command`] for the
//! worker.

use crossterm::event::KeyCode;

use super::app::{App, Tab};
use super::messages::Command;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    NextTab,
    PrevTab,
    GotoTab(Tab),
    Down,
    Up,
    NextPage,
    PrevPage,
    CycleFilter,
    Refresh,
    ToggleDevice,
    DeleteDevice,
    AllOn,
    AllOff,
}

/// Map a key press to an action.
pub fn handle_key(code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Tab => Action::NextTab,
        KeyCode::BackTab => Action::PrevTab,
        KeyCode::Char('1') => Action::GotoTab(Tab::Charts),
        KeyCode::Char('2') => Action::GotoTab(Tab::Sensors),
        KeyCode::Char('3') => Action::GotoTab(Tab::Actuators),
        KeyCode::Char('4') => Action::GotoTab(Tab::History),
        KeyCode::Char('j') | KeyCode::Down => Action::Down,
        KeyCode::Char('k') | KeyCode::Up => Action::Up,
        KeyCode::Char('n') | KeyCode::Right => Action::NextPage,
        KeyCode::Char('p') | KeyCode::Left => Action::PrevPage,
        KeyCode::Char('f') => Action::CycleFilter,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('t') | KeyCode::Enter => Action::ToggleDevice,
        KeyCode::Char('d') => Action::DeleteDevice,
        KeyCode::Char('O') => Action::AllOn,
        KeyCode::Char('X') => Action::AllOff,
        _ => Action::None,
    }
}

/// Apply an action to the app, returning a worker command when one is due.
pub fn apply_action(app: &mut App, action: Action) -> Option<Command> {
    match action {
        Action::None => None,
        Action::Quit => {
            app.quit();
            None
        }
        Action::NextTab => {
            app.active_tab = app.active_tab.next();
            None
        }
        Action::PrevTab => {
            app.active_tab = app.active_tab.prev();
            None
        }
        Action::GotoTab(tab) => {
            app.active_tab = tab;
            None
        }
        Action::Down => {
            if let Some(table) = app.active_device_table() {
                table.select_next();
            }
            None
        }
        Action::Up => {
            if let Some(table) = app.active_device_table() {
                table.select_prev();
            }
            None
        }
        Action::NextPage => {
            if app.active_tab == Tab::History {
                app.history.pager.next_page();
            }
            None
        }
        Action::PrevPage => {
            if app.active_tab == Tab::History {
                app.history.pager.prev_page();
            }
            None
        }
        Action::CycleFilter => {
            match app.active_tab {
                Tab::History => app.history.cycle_filter(),
                _ => {
                    if let Some(table) = app.active_device_table() {
                        table.cycle_filter();
                    }
                }
            }
            None
        }
        Action::Refresh => Some(app.refresh_command()),
        Action::ToggleDevice => {
            let table = app.active_device_table()?;
            let device = table.selected_device()?;
            Some(Command::ToggleDevice {
                id: device.id,
                active: device.active,
            })
        }
        Action::DeleteDevice => {
            let table = app.active_device_table()?;
            let device = table.selected_device()?;
            Some(Command::DeleteDevice(device.id))
        }
        Action::AllOn | Action::AllOff => {
            let target = action == Action::AllOn;
            let table = app.active_device_table()?;
            let ids: Vec<u64> = table.filtered().iter().map(|d| d.id.number).collect();
            if ids.is_empty() {
                return None;
            }
            Some(Command::SetStatusAll {
                class: table.class(),
                ids,
                target,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use verdant_types::{Device, DeviceClass, DeviceId, DeviceType};

    use super::super::messages::BackendEvent;

    fn app_with_sensors(devices: Vec<Device>) -> App {
        let (_tx, rx) = mpsc::channel(1);
        let mut app = App::new(rx, None);
        app.handle_backend_event(BackendEvent::Devices {
            class: DeviceClass::Sensor,
            devices,
        });
        app.active_tab = Tab::Sensors;
        app
    }

    fn device(number: u64, active: bool) -> Device {
        Device {
            id: DeviceId::new(DeviceType::Temperature, number),
            location: "bay".to_string(),
            update_frequency: 30,
            unit: "Cel".to_string(),
            active,
        }
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(handle_key(KeyCode::Char('q')), Action::Quit);
        assert_eq!(handle_key(KeyCode::Esc), Action::Quit);
        assert_eq!(handle_key(KeyCode::Char('z')), Action::None);
    }

    #[test]
    fn test_toggle_targets_inverse_of_displayed_status() {
        let mut app = app_with_sensors(vec![device(1, true)]);
        let cmd = apply_action(&mut app, Action::ToggleDevice);
        match cmd {
            Some(Command::ToggleDevice { id, active }) => {
                assert_eq!(id.number, 1);
                assert!(active);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_toggle_on_empty_list_is_noop() {
        let mut app = app_with_sensors(Vec::new());
        assert!(apply_action(&mut app, Action::ToggleDevice).is_none());
    }

    #[test]
    fn test_all_on_collects_filtered_ids() {
        let mut app = app_with_sensors(vec![device(1, false), device(2, false)]);
        let cmd = apply_action(&mut app, Action::AllOn);
        match cmd {
            Some(Command::SetStatusAll { class, ids, target }) => {
                assert_eq!(class, DeviceClass::Sensor);
                assert_eq!(ids, vec![1, 2]);
                assert!(target);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_refresh_follows_active_tab() {
        let mut app = app_with_sensors(Vec::new());
        app.active_tab = Tab::History;
        assert!(matches!(
            apply_action(&mut app, Action::Refresh),
            Some(Command::RefreshHistory)
        ));
    }

    #[test]
    fn test_page_keys_only_act_on_history_tab() {
        let mut app = app_with_sensors(Vec::new());
        app.active_tab = Tab::Charts;
        assert!(apply_action(&mut app, Action::NextPage).is_none());
        assert_eq!(app.history.pager.current_page(), 1);
    }
}
