use serde_json::{json, Value};

use crate::error::ChoreError;
use crate::models::{Assignment, AssignmentEvent, Household, Membership, TaskTemplate};

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &ChoreError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn household_json(h: &Household) -> Value {
    json!({
        "id": h.id,
        "name": h.name,
        "created_at": h.created_at
    })
}

pub fn membership_json(m: &Membership) -> Value {
    json!({
        "household_id": m.household_id,
        "member_id": m.member_id,
        "joined_on": m.joined_on,
        "left_on": m.left_on
    })
}

pub fn template_json(t: &TaskTemplate) -> Value {
    json!({
        "id": t.id,
        "household_id": t.household_id,
        "name": t.name,
        "point_value": t.point_value,
        "active": t.active,
        "rule_type": t.rule_type().as_str(),
        "rule_config": t.rule.payload(),
        "created_at": t.created_at,
        "updated_at": t.updated_at
    })
}

pub fn assignment_json(a: &Assignment) -> Value {
    let mut v = json!({
        "id": a.id,
        "template_id": a.template_id,
        "household_id": a.household_id,
        "due_date": a.due_date,
        "assignee_id": a.assignee_id,
        "status": a.status.as_str(),
        "created_at": a.created_at,
        "updated_at": a.updated_at
    });
    if let Some(ref accepted) = a.accepted_at {
        v["accepted_at"] = json!(accepted);
    }
    if let Some(ref completed) = a.completed_at {
        v["completed_at"] = json!(completed);
    }
    if a.is_offer() {
        v["deadline"] = json!(a.deadline);
        v["candidates"] = json!(a
            .candidates
            .iter()
            .map(|c| c.member_id.as_str())
            .collect::<Vec<_>>());
        v["declined_by"] = json!(a.declined_by());
    }
    v
}

pub fn event_json(e: &AssignmentEvent) -> Value {
    json!({
        "seq": e.seq,
        "assignment_id": e.assignment_id,
        "template_id": e.template_id,
        "household_id": e.household_id,
        "kind": e.kind.as_str(),
        "member_id": e.member_id,
        "points": e.points,
        "occurred_at": e.occurred_at
    })
}
