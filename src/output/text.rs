use crate::engine::generator::GenerationReport;
use crate::engine::negotiation::SweepReport;
use crate::models::{Assignment, AssignmentEvent, Household, Membership, TaskTemplate};

fn short(id: &str) -> &str {
    &id[..std::cmp::min(8, id.len())]
}

pub fn print_household_list(households: &[Household]) {
    if households.is_empty() {
        println!("No households found.");
        return;
    }
    for h in households {
        println!("  {} - {}", h.id, h.name);
    }
}

pub fn print_member_list(members: &[Membership]) {
    if members.is_empty() {
        println!("No members found.");
        return;
    }
    for m in members {
        match m.left_on {
            Some(ref left) => println!("  {} (joined {}, left {left})", m.member_id, m.joined_on),
            None => println!("  {} (joined {})", m.member_id, m.joined_on),
        }
    }
}

pub fn print_template(t: &TaskTemplate) {
    println!("Template: {} ({})", t.name, t.id);
    println!("  Household: {}", t.household_id);
    println!("  Rule: {} {}", t.rule_type().as_str(), t.rule.payload());
    println!("  Points: {}", t.point_value);
    println!("  Active: {}", t.active);
    println!("  Updated: {}", t.updated_at);
}

pub fn print_template_list(templates: &[TaskTemplate]) {
    if templates.is_empty() {
        println!("No templates found.");
        return;
    }
    for t in templates {
        println!(
            "  {} ({}) [{}] {}pts{}",
            t.name,
            short(&t.id),
            t.rule_type().as_str(),
            t.point_value,
            if t.active { "" } else { " inactive" }
        );
    }
}

pub fn print_assignment(a: &Assignment) {
    println!("Assignment: {}", a.id);
    println!("  Template: {}", a.template_id);
    println!("  Status: {}", a.status.as_str());
    if let Some(ref due) = a.due_date {
        println!("  Due: {due}");
    }
    if let Some(ref assignee) = a.assignee_id {
        println!("  Assignee: {assignee}");
    }
    if a.is_offer() {
        if let Some(ref deadline) = a.deadline {
            println!("  Deadline: {deadline}");
        }
        for c in &a.candidates {
            match c.declined_at {
                Some(ref at) => println!("  Candidate: {} (declined {at})", c.member_id),
                None => println!("  Candidate: {}", c.member_id),
            }
        }
    }
    if let Some(ref completed) = a.completed_at {
        println!("  Completed: {completed}");
    }
}

pub fn print_assignment_list(assignments: &[Assignment]) {
    if assignments.is_empty() {
        println!("No assignments found.");
        return;
    }
    for a in assignments {
        let when = a.due_date.as_deref().unwrap_or("offer");
        let who = a.assignee_id.as_deref().unwrap_or("-");
        println!(
            "  [{}] {} {} ({}) @{who}",
            a.status.as_str(),
            when,
            short(&a.template_id),
            short(&a.id)
        );
    }
}

pub fn print_events(events: &[AssignmentEvent]) {
    if events.is_empty() {
        println!("No events.");
        return;
    }
    for e in events {
        println!(
            "  #{} {} {} {} +{} ({})",
            e.seq,
            e.kind.as_str(),
            e.member_id,
            short(&e.assignment_id),
            e.points,
            e.occurred_at
        );
    }
}

pub fn print_generation_report(r: &GenerationReport) {
    println!("Generated {} .. {}", r.window_start, r.window_end);
    println!(
        "  created={} already_generated={} no_instance={} failed_units={} failed_templates={}",
        r.created, r.already_generated, r.no_instance, r.failed_units, r.failed_templates
    );
    if !r.skipped_households.is_empty() {
        println!("  skipped households: {}", r.skipped_households.join(", "));
    }
}

pub fn print_sweep_report(r: &SweepReport) {
    println!("Expired {} offer(s)", r.expired.len());
    for id in &r.expired {
        println!("  {id}");
    }
    if r.failed > 0 {
        println!("  failed: {}", r.failed);
    }
}
