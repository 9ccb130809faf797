//!
//! NCBI genetic codes
//!
//! Tables are in the NCBI `ncbieaa` layout: 64 amino acids for the codons
//! `TTT, TTC, TTA, TTG, TCT, ...` (bases ordered `T C A G`), `*` for stop.
//!
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::state::codon::{Codon, N_CODONS};
use itertools::Itertools;
use once_cell::sync::Lazy;

/// amino acid of a codon that cannot be translated
pub const UNKNOWN_AMINO: u8 = b'X';
/// amino acid of stop codons
pub const STOP: u8 = b'*';

///
/// Translation table of one NCBI genetic code
///
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticCode {
    pub id: u8,
    pub name: &'static str,
    table: [u8; N_CODONS],
}

static GENETIC_CODES: Lazy<Vec<GeneticCode>> = Lazy::new(|| {
    vec![
        GeneticCode::new(1, "Standard", b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(2, "Vertebrate Mitochondrial", b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG"),
        GeneticCode::new(3, "Yeast Mitochondrial", b"FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(4, "Mold, Protozoan, and Coelenterate Mitochondrial", b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(5, "Invertebrate Mitochondrial", b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSSSVVVVAAAADDEEGGGG"),
        GeneticCode::new(6, "Ciliate, Dasycladacean and Hexamita Nuclear", b"FFLLSSSSYYQQCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(9, "Echinoderm and Flatworm Mitochondrial", b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG"),
        GeneticCode::new(10, "Euplotid Nuclear", b"FFLLSSSSYY**CCCWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(11, "Bacterial, Archaeal and Plant Plastid", b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(12, "Alternative Yeast Nuclear", b"FFLLSSSSYY**CC*WLLLSPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(13, "Ascidian Mitochondrial", b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSGGVVVVAAAADDEEGGGG"),
        GeneticCode::new(14, "Alternative Flatworm Mitochondrial", b"FFLLSSSSYYY*CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG"),
        GeneticCode::new(15, "Blepharisma Macronuclear", b"FFLLSSSSYY*QCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(16, "Chlorophycean Mitochondrial", b"FFLLSSSSYY*LCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(21, "Trematode Mitochondrial", b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNNKSSSSVVVVAAAADDEEGGGG"),
        GeneticCode::new(22, "Scenedesmus obliquus Mitochondrial", b"FFLLSS*SYY*LCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(23, "Thraustochytrium Mitochondrial", b"FF*LSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(24, "Rhabdopleuridae Mitochondrial", b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSSKVVVVAAAADDEEGGGG"),
        GeneticCode::new(25, "Candidate Division SR1 and Gracilibacteria", b"FFLLSSSSYY**CCGWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(26, "Pachysolen tannophilus Nuclear", b"FFLLSSSSYY**CC*WLLLAPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(27, "Karyorelict Nuclear", b"FFLLSSSSYYQQCCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(28, "Condylostoma Nuclear", b"FFLLSSSSYYQQCCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(29, "Mesodinium Nuclear", b"FFLLSSSSYYYYCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(30, "Peritrich Nuclear", b"FFLLSSSSYYEECC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(31, "Blastocrithidia Nuclear", b"FFLLSSSSYYEECCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(32, "Balanophoraceae Plastid", b"FFLLSSSSYY*WCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        GeneticCode::new(33, "Cephalodiscidae Mitochondrial", b"FFLLSSSSYYY*CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSSKVVVVAAAADDEEGGGG"),
    ]
});

/// NCBI base order
const NCBI_BASES: &[u8; 4] = b"TCAG";

/// `T/U=0, C=1, A=2, G=3`
fn ncbi_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

impl GeneticCode {
    fn new(id: u8, name: &'static str, ncbieaa: &[u8; N_CODONS]) -> GeneticCode {
        GeneticCode {
            id,
            name,
            table: *ncbieaa,
        }
    }
    ///
    /// Genetic code of the NCBI id
    ///
    pub fn get(id: u8) -> Result<&'static GeneticCode> {
        GENETIC_CODES
            .iter()
            .find(|code| code.id == id)
            .ok_or(Error::UnknownGeneticCode(id))
    }
    /// The standard code (id 1)
    pub fn standard() -> &'static GeneticCode {
        &GENETIC_CODES[0]
    }
    /// Every available code
    pub fn all() -> &'static [GeneticCode] {
        &GENETIC_CODES
    }
    ///
    /// Amino acid of `codon`; `X` if a base is not one of ACGTU.
    ///
    pub fn translate(&self, codon: &Codon) -> u8 {
        let [a, b, c] = *codon.as_bytes();
        match (ncbi_index(a), ncbi_index(b), ncbi_index(c)) {
            (Some(a), Some(b), Some(c)) => self.table[a * 16 + b * 4 + c],
            _ => UNKNOWN_AMINO,
        }
    }
    /// Translate consecutive codons of `seq` (trailing bases are ignored)
    pub fn translate_seq(&self, seq: &[u8]) -> Vec<u8> {
        seq.chunks_exact(3)
            .map(|chunk| match Codon::from_bytes(chunk) {
                Some(codon) => self.translate(&codon),
                None => UNKNOWN_AMINO,
            })
            .collect()
    }
    pub fn is_stop(&self, codon: &Codon) -> bool {
        self.translate(codon) == STOP
    }
    ///
    /// DNA codons (over `TCAG`) that code `amino`
    ///
    pub fn codons(&self, amino: u8) -> Vec<Codon> {
        self.table
            .iter()
            .enumerate()
            .filter(|(_, &aa)| aa == amino)
            .map(|(i, _)| {
                Codon::new(
                    NCBI_BASES[i / 16],
                    NCBI_BASES[(i / 4) % 4],
                    NCBI_BASES[i % 4],
                )
            })
            .collect()
    }
    ///
    /// Non-stop codons over the nucleotide `alphabet` with their amino acid
    ///
    pub fn sense_codons(&self, alphabet: &Alphabet) -> Vec<(Codon, u8)> {
        (0..N_CODONS)
            .filter_map(|i| Codon::from_index(alphabet, i))
            .map(|codon| (codon, self.translate(&codon)))
            .filter(|&(_, aa)| aa != STOP && aa != UNKNOWN_AMINO)
            .collect()
    }
    ///
    /// Distinct amino acids coded by this code (stop excluded), sorted
    ///
    pub fn amino_acids(&self) -> Vec<u8> {
        self.table
            .iter()
            .copied()
            .filter(|&aa| aa != STOP)
            .sorted()
            .dedup()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"ATG", b'M')]
    #[test_case(b"TAA", b'*')]
    #[test_case(b"TGA", b'*')]
    #[test_case(b"TTT", b'F')]
    #[test_case(b"GGG", b'G')]
    #[test_case(b"AUG", b'M')]
    #[test_case(b"ANG", b'X')]
    fn standard_translation(codon: &[u8; 3], amino: u8) {
        let codon = Codon::from_bytes(codon).unwrap();
        assert_eq!(GeneticCode::standard().translate(&codon), amino);
    }
    #[test]
    fn vertebrate_mitochondrial() {
        let code = GeneticCode::get(2).unwrap();
        assert_eq!(code.translate(&Codon::new(b'T', b'G', b'A')), b'W');
        assert_eq!(code.translate(&Codon::new(b'A', b'G', b'A')), b'*');
        assert!(matches!(
            GeneticCode::get(7),
            Err(Error::UnknownGeneticCode(7))
        ));
    }
    #[test]
    fn codons_of_amino_acid() {
        let code = GeneticCode::standard();
        assert_eq!(code.codons(b'M'), vec![Codon::new(b'A', b'T', b'G')]);
        assert_eq!(code.codons(b'L').len(), 6);
        assert_eq!(code.codons(b'*').len(), 3);
        assert!(code.codons(b'B').is_empty());
        assert_eq!(code.amino_acids().len(), 20);
        assert_eq!(code.sense_codons(&Alphabet::dna()).len(), 61);
        let rna = code.sense_codons(&Alphabet::rna());
        assert!(rna.contains(&(Codon::new(b'A', b'U', b'G'), b'M')));
    }
    #[test]
    fn translate_sequence() {
        let code = GeneticCode::standard();
        assert_eq!(code.translate_seq(b"ATGTTTTAAGG"), b"MF*".to_vec());
    }
}
