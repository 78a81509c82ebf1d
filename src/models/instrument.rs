//! Tracked futures products and their static descriptors

use std::fmt;

/// Price unit quoted by an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceUnit {
    DollarsPerBarrel,
    DollarsPerMmbtu,
}

impl PriceUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            PriceUnit::DollarsPerBarrel => "$/BBL",
            PriceUnit::DollarsPerMmbtu => "$/MMBtu",
        }
    }
}

/// Which y axis an instrument is plotted against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartAxis {
    /// Oil-priced products, left axis
    Oil,
    /// Gas-priced products, right axis
    Gas,
}

/// Static description of one upstream product
#[derive(Debug)]
pub struct InstrumentSpec {
    pub product_id: u32,
    pub label: &'static str,
    pub unit: PriceUnit,
    pub axis: ChartAxis,
}

const WTI: InstrumentSpec = InstrumentSpec {
    product_id: 425,
    label: "WTI",
    unit: PriceUnit::DollarsPerBarrel,
    axis: ChartAxis::Oil,
};

const HENRY_HUB: InstrumentSpec = InstrumentSpec {
    product_id: 444,
    label: "Henry Hub",
    unit: PriceUnit::DollarsPerMmbtu,
    axis: ChartAxis::Gas,
};

const BRENT: InstrumentSpec = InstrumentSpec {
    product_id: 424,
    label: "Brent",
    unit: PriceUnit::DollarsPerBarrel,
    axis: ChartAxis::Oil,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Wti,
    HenryHub,
    Brent,
}

impl Instrument {
    /// Every tracked instrument, in pull and display order
    pub const ALL: [Instrument; 3] = [Instrument::Wti, Instrument::HenryHub, Instrument::Brent];

    pub fn spec(self) -> &'static InstrumentSpec {
        match self {
            Instrument::Wti => &WTI,
            Instrument::HenryHub => &HENRY_HUB,
            Instrument::Brent => &BRENT,
        }
    }

    pub fn product_id(self) -> u32 {
        self.spec().product_id
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn unit(self) -> PriceUnit {
        self.spec().unit
    }

    pub fn axis(self) -> ChartAxis {
        self.spec().axis
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
