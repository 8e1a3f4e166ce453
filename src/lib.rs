//! A fixed-script TCP three-way handshake over a raw IPv4 socket.
//!
//! The client sends a hand-built SYN (seq 200) to 127.0.0.1:12345, waits for the
//! server's SYN-ACK (seq 400, ack 201) and answers with the final ACK (seq 600,
//! ack 401). Opening the raw socket needs CAP_NET_RAW.

pub mod config;
pub mod handshake;
pub mod ip;
pub mod packet;
pub mod rawsocket;
pub mod tcp;
