//! Element ids the scenarios address.
//!
//! One constant per id the app renders; grouped by page. Scenario code
//! never spells out a raw id string.

pub mod login {
    pub const USERNAME_INPUT: &str = "login-username-input";
    pub const PASSWORD_INPUT: &str = "login-password-input";
    pub const SUBMIT_BUTTON: &str = "login-submit-button";
    pub const ERROR_BANNER: &str = "login-error-banner";
}

pub mod nav {
    pub const SIDEBAR: &str = "main-sidebar";
    pub const SCHEDULE_LINK: &str = "nav-schedule-link";
    pub const CLIENTS_LINK: &str = "nav-clients-link";
    pub const GROUPS_LINK: &str = "nav-groups-link";
    pub const SHIFTS_LINK: &str = "nav-shifts-link";
    pub const LOGOUT_BUTTON: &str = "nav-logout-button";
    pub const USER_MENU: &str = "nav-user-menu";
}

pub mod clients {
    pub const ADD_BUTTON: &str = "clients-add-button";
    pub const SEARCH_INPUT: &str = "clients-search-input";
    pub const TABLE: &str = "clients-table";
    pub const NAME_INPUT: &str = "client-name-input";
    pub const SHORT_CODE_INPUT: &str = "client-short-code-input";
    pub const GROUP_SELECT: &str = "client-group-select";
    pub const SAVE_BUTTON: &str = "client-save-button";
    pub const DELETE_BUTTON: &str = "client-delete-button";
    pub const DELETE_CONFIRM_BUTTON: &str = "client-delete-confirm-button";
}

pub mod groups {
    pub const ADD_BUTTON: &str = "groups-add-button";
    pub const NAME_INPUT: &str = "group-name-input";
    pub const SAVE_BUTTON: &str = "group-save-button";
}

pub mod shifts {
    pub const ADD_BUTTON: &str = "shifts-add-button";
    pub const NAME_INPUT: &str = "shift-name-input";
    pub const SHORT_CODE_INPUT: &str = "shift-short-code-input";
    pub const START_TIME_INPUT: &str = "shift-start-time-input";
    pub const END_TIME_INPUT: &str = "shift-end-time-input";
    pub const COLOR_PICKER: &str = "shift-color-picker";
    pub const SAVE_BUTTON: &str = "shift-save-button";
}

pub mod schedule {
    pub const TOOLBAR: &str = "schedule-toolbar";
    pub const WEEK_PICKER: &str = "schedule-week-picker";
    pub const PREV_WEEK_BUTTON: &str = "schedule-prev-week-button";
    pub const NEXT_WEEK_BUTTON: &str = "schedule-next-week-button";
    pub const PUBLISH_BUTTON: &str = "schedule-publish-button";
    pub const ENTRY_DIALOG: &str = "schedule-entry-dialog";
    pub const ENTRY_DIALOG_SHIFT_SELECT: &str = "schedule-entry-shift-select";
    pub const ENTRY_DIALOG_NOTE_INPUT: &str = "schedule-entry-note-input";
    pub const ENTRY_DIALOG_SAVE_BUTTON: &str = "schedule-entry-save-button";
    pub const ENTRY_DIALOG_CANCEL_BUTTON: &str = "schedule-entry-cancel-button";
}
