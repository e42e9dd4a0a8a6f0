//! Renders an event into the HTML message and link buttons posted to channels.
//!
//! Pure function of (event, status, now); the engine calls it once per event
//! per cycle and hands the same payload to every channel.

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::event::Event;
use crate::status::EventStatus;

const GOOGLE_CALENDAR_URL: &str = "https://www.google.com/calendar/render";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// A message ready to hand to a channel publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    /// Telegram-flavored HTML.
    pub text: String,
    /// One row of URL buttons under the message.
    pub buttons: Vec<LinkButton>,
    pub disable_preview: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub disable_preview: bool,
}

pub fn render(
    event: &Event,
    status: EventStatus,
    now: DateTime<Utc>,
    options: RenderOptions,
) -> RenderedPost {
    RenderedPost {
        text: render_text(event, status, now),
        buttons: render_buttons(event),
        disable_preview: options.disable_preview,
    }
}

fn badge(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Upcoming => "🟡 <b>Upcoming</b>",
        EventStatus::Running => "🟢 <b>Running</b>",
        EventStatus::Ended => "🔴 <b>Ended</b>",
    }
}

pub fn render_text(event: &Event, status: EventStatus, now: DateTime<Utc>) -> String {
    let organizers = if event.organizers.is_empty() {
        "N/A".to_string()
    } else {
        event.organizers.join(", ")
    };

    let mut links = String::new();
    if !event.ctftime_url.is_empty() {
        links.push_str(&format!(
            "<a href=\"{}\">View on CTFtime</a>",
            escape_html(&event.ctftime_url)
        ));
    }
    if let Some(website) = &event.website {
        if !links.is_empty() {
            links.push_str(" • ");
        }
        links.push_str(&format!("<a href=\"{}\">Website</a>", escape_html(website)));
    }

    let mut lines = vec![
        badge(status).to_string(),
        format!("<b>{}</b>", escape_html(&event.title)),
        format!("Format: <i>{}</i>", event.format),
        format!("Starts: <b>{}</b>", format_instant(event.start)),
        format!("Ends: <b>{}</b>", format_instant(event.end)),
        format!("Duration: <i>{}</i>", format_duration(event.end - event.start)),
        format!("Weight: <b>{}</b>", event.weight),
        format!("Organizers: <i>{}</i>", escape_html(&organizers)),
        String::new(),
        links,
    ];

    let countdown = match status {
        EventStatus::Upcoming => Some(("⏳ Starts in", event.start - now)),
        EventStatus::Running => Some(("⏱ Ends in", event.end - now)),
        EventStatus::Ended => None,
    };
    if let Some((label, delta)) = countdown.filter(|(_, d)| *d > Duration::zero()) {
        lines.push(format!(
            "{label} ~ {}h {}m",
            delta.num_hours(),
            delta.num_minutes() % 60
        ));
    }

    lines.join("\n").trim().to_string()
}

fn render_buttons(event: &Event) -> Vec<LinkButton> {
    let mut buttons = Vec::new();

    if !event.ctftime_url.is_empty() {
        buttons.push(LinkButton {
            label: "CTFtime".into(),
            url: event.ctftime_url.clone(),
        });
    }
    if let Some(website) = &event.website {
        buttons.push(LinkButton {
            label: "Website".into(),
            url: website.clone(),
        });
    }
    buttons.push(LinkButton {
        label: "Add to Google Calendar".into(),
        url: google_calendar_link(event),
    });

    buttons
}

/// Template link that pre-fills a Google Calendar event.
pub fn google_calendar_link(event: &Event) -> String {
    let fmt = |d: DateTime<Utc>| d.format("%Y%m%dT%H%M%SZ").to_string();
    let link = if event.ctftime_url.is_empty() {
        event.website.clone().unwrap_or_default()
    } else {
        event.ctftime_url.clone()
    };
    let details = format!("CTFtime event\n{link}").trim().to_string();
    let dates = format!("{}/{}", fmt(event.start), fmt(event.end));

    match Url::parse_with_params(
        GOOGLE_CALENDAR_URL,
        &[
            ("action", "TEMPLATE"),
            ("text", event.title.as_str()),
            ("dates", dates.as_str()),
            ("details", details.as_str()),
            ("ctz", "UTC"),
        ],
    ) {
        Ok(url) => url.to_string(),
        Err(_) => GOOGLE_CALENDAR_URL.to_string(),
    }
}

pub fn format_instant(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// `2d 4h`, `6h`, or `45m` for sub-hour events.
pub fn format_duration(duration: Duration) -> String {
    let days = duration.num_days();
    let hours = duration.num_hours() % 24;
    let minutes = duration.num_minutes() % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 && days == 0 && hours == 0 {
        parts.push(format!("{minutes}m"));
    }

    if parts.is_empty() {
        format!("{}s", duration.num_seconds().max(0))
    } else {
        parts.join(" ")
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
