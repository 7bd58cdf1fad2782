use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use time::{Date, format_description::FormatItem, macros::format_description};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Clap value parser for `YYYY-MM-DD` dates.
pub fn parse_date(raw: &str) -> Result<Date, String> {
	Date::parse(raw.trim(), DATE_FORMAT).map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
