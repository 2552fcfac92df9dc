//! Shared test harness modules for the border wait CLI.

use super::*;

mod helpers;
