use std::fmt::Write;

use time::OffsetDateTime;

use super::{
    forms::FieldErrors,
    notifications::Notification,
    page::WorkspaceSettingsPage,
    view::{format_timestamp, invites_summary, members_summary, time_ago},
};
use crate::models::{invite::Invite, membership::{MemberLevel, Membership}};

pub const CSRF_FIELD: &str = "csrf_token";

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Base path of every settings form for `workspace`.
pub fn settings_path(workspace: &str) -> String {
    format!("/{}/settings", urlencoding::encode(workspace))
}

fn post_form(out: &mut String, action: &str, csrf_token: &str, body: &str) {
    let _ = write!(
        out,
        r#"<form method="post" action="{}"><input type="hidden" name="{}" value="{}">{}</form>"#,
        escape_html(action),
        CSRF_FIELD,
        escape_html(csrf_token),
        body
    );
}

fn field_error(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|msg| format!(r#"<span class="field-error">{}</span>"#, escape_html(msg)))
        .unwrap_or_default()
}

fn level_select(selected: &str) -> String {
    let mut html = String::from(r#"<select name="level">"#);
    for level in MemberLevel::ALL {
        let marker = if level.as_str().eq_ignore_ascii_case(selected.trim()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<option value="{}"{}>{}</option>"#,
            level.as_str(),
            marker,
            level.title()
        );
    }
    html.push_str("</select>");
    html
}

/// Renders the whole settings page. `notifications` are shown once.
pub fn render_page(
    page: &WorkspaceSettingsPage,
    notifications: &[Notification],
    csrf_token: &str,
    now: OffsetDateTime,
) -> String {
    let visibility = page.visibility();
    let workspace = page.workspace();
    let base = settings_path(&workspace.name);
    let title = escape_html(&workspace.name);

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{title} settings</title></head><body><main class="workspace-settings"><h1>{title}</h1>"#
    );

    for note in notifications {
        let _ = write!(
            out,
            r#"<div class="notification notification-{}" role="status">{}</div>"#,
            note.kind.as_str(),
            escape_html(&note.message)
        );
    }

    render_my_membership(&mut out, page, &base, csrf_token, visibility.leave_form, now);
    if visibility.plan {
        render_plan(&mut out, page, now);
    }
    if visibility.billing {
        render_billing(&mut out, page, &base, csrf_token);
    }
    if visibility.invites {
        render_invites(&mut out, page, &base, csrf_token, now);
    }
    if visibility.members {
        render_members(&mut out, page, &base, csrf_token, now);
    }
    if visibility.delete_workspace {
        render_danger_zone(&mut out, page, &base, csrf_token);
    }

    out.push_str("</main></body></html>");
    out
}

fn render_my_membership(
    out: &mut String,
    page: &WorkspaceSettingsPage,
    base: &str,
    csrf_token: &str,
    can_leave: bool,
    now: OffsetDateTime,
) {
    let membership = page.membership();
    let _ = write!(
        out,
        r#"<section class="panel my-membership"><h2>My membership</h2><p>{}. Joined <time title="{}">{}</time>.</p>"#,
        membership.level.title(),
        format_timestamp(membership.created_at),
        time_ago(membership.created_at, now)
    );
    if can_leave {
        post_form(
            out,
            &format!("{base}/leave"),
            csrf_token,
            r#"<button type="submit">Leave workspace</button>"#,
        );
    }
    out.push_str("</section>");
}

fn render_plan(out: &mut String, page: &WorkspaceSettingsPage, now: OffsetDateTime) {
    out.push_str(r#"<section class="panel plan"><h2>Plan</h2>"#);
    match page.subscription() {
        Some(sub) => {
            let _ = write!(
                out,
                "<p>Plan: {}</p><p>Status: {}</p>",
                sub.level.as_text(),
                sub.status_text(now)
            );
            if !sub.is_inactive(now) {
                let _ = write!(
                    out,
                    "<p>Members: {}</p><p>Started: {}</p><p>Expires: {} ({})</p>",
                    sub.number_of_editors,
                    format_timestamp(sub.from_date),
                    format_timestamp(sub.expiration_date),
                    time_ago(sub.expiration_date, now)
                );
            }
        }
        None => out.push_str("<p>No subscription.</p>"),
    }
    let _ = write!(
        out,
        r#"<a href="/{}/subscription">Change plan</a></section>"#,
        urlencoding::encode(&page.workspace().name)
    );
}

fn render_billing(out: &mut String, page: &WorkspaceSettingsPage, base: &str, csrf_token: &str) {
    let form = page.billing_form();
    out.push_str(r#"<section class="panel billing"><h2>Billing information</h2>"#);
    let body = format!(
        r#"<label>EU VAT number <input type="text" name="eu_vat" value="{}"></label>{}<label>Billing email <input type="email" name="external_billing_email" value="{}"></label>{}<button type="submit">Save</button>"#,
        escape_html(&form.values.eu_vat),
        field_error(&form.errors, "eu_vat"),
        escape_html(&form.values.external_billing_email),
        field_error(&form.errors, "external_billing_email"),
    );
    post_form(out, &format!("{base}/billing"), csrf_token, &body);
    out.push_str("</section>");
}

fn render_invite_row(
    out: &mut String,
    invite: &Invite,
    base: &str,
    csrf_token: &str,
    can_resend: bool,
    now: OffsetDateTime,
) {
    let _ = write!(
        out,
        r#"<li class="invite"><span class="email">{}</span> <span class="level">{}</span> <span class="meta">Invited by {} {}</span>"#,
        escape_html(&invite.email),
        invite.level.title(),
        escape_html(&invite.created_by_name),
        time_ago(invite.created_at, now)
    );
    if can_resend {
        post_form(
            out,
            &format!("{base}/invites/{}/resend", invite.id),
            csrf_token,
            r#"<button type="submit">Resend</button>"#,
        );
    }
    post_form(
        out,
        &format!("{base}/invites/{}/cancel", invite.id),
        csrf_token,
        r#"<button type="submit">Cancel invite</button>"#,
    );
    out.push_str("</li>");
}

fn render_invites(
    out: &mut String,
    page: &WorkspaceSettingsPage,
    base: &str,
    csrf_token: &str,
    now: OffsetDateTime,
) {
    let visibility = page.visibility();
    let _ = write!(
        out,
        r#"<section class="panel invites"><h2>Invites</h2><p>{}</p><ul>"#,
        invites_summary(page.invites().len())
    );
    for invite in page.invites() {
        render_invite_row(out, invite, base, csrf_token, visibility.resend_invite, now);
    }
    out.push_str("</ul>");

    if visibility.invite_form {
        let form = page.invite_form();
        let body = format!(
            r#"<label>Email <input type="email" name="email" value="{}"></label>{}<label>Role {}</label>{}<button type="submit">Send invite</button>"#,
            escape_html(&form.values.email),
            field_error(&form.errors, "email"),
            level_select(&form.values.level),
            field_error(&form.errors, "level"),
        );
        post_form(out, &format!("{base}/invites"), csrf_token, &body);
    }
    out.push_str("</section>");
}

fn render_member_row(
    out: &mut String,
    page: &WorkspaceSettingsPage,
    member: &Membership,
    base: &str,
    csrf_token: &str,
    now: OffsetDateTime,
) {
    let _ = write!(
        out,
        r#"<li class="member"><span class="name">{}</span> <span class="email">{}</span> <span class="level">{}</span> <span class="meta">Joined {}</span>"#,
        escape_html(&member.name),
        escape_html(&member.email),
        member.level.title(),
        time_ago(member.created_at, now)
    );

    if page.is_own_row(member) {
        out.push_str(r#" <span class="tag">THIS IS YOU</span></li>"#);
        return;
    }

    let expanded = page.is_expanded(member.id);
    post_form(
        out,
        &format!("{base}/members/{}/toggle", member.id),
        csrf_token,
        if expanded {
            r#"<button type="submit">Hide</button>"#
        } else {
            r#"<button type="submit">Manage</button>"#
        },
    );

    if expanded {
        if page.visibility().role_change {
            let errors = page.role_errors(member.id).cloned().unwrap_or_default();
            let body = format!(
                r#"<label>Role {}</label>{}<button type="submit">Change role</button>"#,
                level_select(member.level.as_str()),
                field_error(&errors, "level"),
            );
            post_form(
                out,
                &format!("{base}/members/{}/level", member.id),
                csrf_token,
                &body,
            );
        }
        post_form(
            out,
            &format!("{base}/members/{}/remove", member.id),
            csrf_token,
            r#"<button type="submit">Remove from workspace</button>"#,
        );
    }
    out.push_str("</li>");
}

fn render_members(
    out: &mut String,
    page: &WorkspaceSettingsPage,
    base: &str,
    csrf_token: &str,
    now: OffsetDateTime,
) {
    let _ = write!(
        out,
        r#"<section class="panel members"><h2>Members</h2><p>{}</p><ul>"#,
        members_summary(page.members())
    );
    for member in page.members() {
        render_member_row(out, page, member, base, csrf_token, now);
    }
    out.push_str("</ul></section>");
}

fn render_danger_zone(out: &mut String, page: &WorkspaceSettingsPage, base: &str, csrf_token: &str) {
    out.push_str(
        r#"<section class="panel danger-zone"><h2>Danger zone</h2><p>All projects in this workspace will be deleted permanently. You need to cancel any active plan before the workspace can be deleted.</p>"#,
    );
    post_form(
        out,
        &format!("{base}/delete"),
        csrf_token,
        r#"<button type="submit">Delete workspace</button>"#,
    );
    if page.delete_confirmation().is_shown() {
        post_form(
            out,
            &format!("{base}/delete/confirm"),
            csrf_token,
            r#"<button type="submit" class="danger">Yes, I am really sure!</button>"#,
        );
    }
    out.push_str("</section>");
}
