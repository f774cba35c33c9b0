/// The size of the buffer datagrams are read into.
///
/// A full sized ethernet frame fits with room to spare.
pub const MAX_PACKET_SIZE: usize = 1514;
