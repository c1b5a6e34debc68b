#[path = "property/serialize_fixed_point.rs"]
mod serialize_fixed_point;

#[path = "property/traversal_restores_state.rs"]
mod traversal_restores_state;
