/// Live room identifiers as used by blrec (`room_<id>` config tables).
pub type RoomId = u64;
