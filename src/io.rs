pub mod fasta;
pub mod gff;
pub mod hmmer;
